/// Expression walking.
///
/// Expressions never declare a named function themselves, but closures,
/// arrow functions, and anonymous classes can carry one: a closure body
/// may declare a function, and an anonymous class has methods.  This walk
/// descends through the sub-expressions that can contain them.
use mago_syntax::ast::*;

use crate::syntax::{NodeId, NodeKind};

use super::TreeBuilder;

impl<'a> TreeBuilder<'a> {
    pub(super) fn add_expression(&mut self, parent: NodeId, expression: &'a Expression<'a>) {
        match expression {
            // ── Closure: `function (Type $param) { … }` ──
            Expression::Closure(closure) => {
                let id = self.push(parent, NodeKind::Block, closure);
                self.add_signature_references(
                    id,
                    &closure.parameter_list,
                    closure.return_type_hint.as_ref(),
                );
                self.add_statements(id, closure.body.statements.iter());
            }
            // ── Arrow function: `fn(Type $param) => expr` ──
            Expression::ArrowFunction(arrow) => {
                let id = self.push(parent, NodeKind::Block, arrow);
                self.add_signature_references(
                    id,
                    &arrow.parameter_list,
                    arrow.return_type_hint.as_ref(),
                );
                self.add_expression(id, arrow.expression);
            }
            Expression::AnonymousClass(class) => self.add_anonymous_class(parent, class),
            // ── Sub-expressions that might contain one of the above ──
            Expression::Parenthesized(p) => self.add_expression(parent, p.expression),
            Expression::Assignment(a) => {
                self.add_expression(parent, a.lhs);
                self.add_expression(parent, a.rhs);
            }
            Expression::Binary(bin) => {
                self.add_expression(parent, bin.lhs);
                self.add_expression(parent, bin.rhs);
            }
            Expression::Conditional(cond) => {
                self.add_expression(parent, cond.condition);
                if let Some(then) = cond.then {
                    self.add_expression(parent, then);
                }
                self.add_expression(parent, cond.r#else);
            }
            Expression::UnaryPrefix(u) => self.add_expression(parent, u.operand),
            Expression::UnaryPostfix(u) => self.add_expression(parent, u.operand),
            Expression::Call(call) => self.add_call(parent, call),
            Expression::Instantiation(inst) => {
                self.add_expression(parent, inst.class);
                if let Some(args) = &inst.argument_list {
                    self.add_arguments(parent, args);
                }
            }
            Expression::Array(arr) => self.add_array_elements(parent, arr.elements.iter()),
            Expression::LegacyArray(arr) => self.add_array_elements(parent, arr.elements.iter()),
            Expression::Match(m) => {
                self.add_expression(parent, m.expression);
                for arm in m.arms.iter() {
                    self.add_expression(parent, arm.expression());
                }
            }
            Expression::Access(access) => match access {
                Access::Property(pa) => self.add_expression(parent, pa.object),
                Access::NullSafeProperty(pa) => self.add_expression(parent, pa.object),
                Access::StaticProperty(pa) => self.add_expression(parent, pa.class),
                Access::ClassConstant(pa) => self.add_expression(parent, pa.class),
            },
            Expression::Yield(y) => match y {
                Yield::Value(yv) => {
                    if let Some(value) = yv.value {
                        self.add_expression(parent, value);
                    }
                }
                Yield::Pair(yp) => {
                    self.add_expression(parent, yp.key);
                    self.add_expression(parent, yp.value);
                }
                Yield::From(yf) => self.add_expression(parent, yf.iterator),
            },
            Expression::Throw(t) => self.add_expression(parent, t.exception),
            Expression::Clone(c) => self.add_expression(parent, c.object),
            Expression::Pipe(p) => {
                self.add_expression(parent, p.input);
                self.add_expression(parent, p.callable);
            }
            _ => {}
        }
    }

    fn add_call(&mut self, parent: NodeId, call: &'a Call<'a>) {
        match call {
            Call::Function(fc) => {
                self.add_expression(parent, fc.function);
                self.add_arguments(parent, &fc.argument_list);
            }
            Call::Method(mc) => {
                self.add_expression(parent, mc.object);
                self.add_arguments(parent, &mc.argument_list);
            }
            Call::NullSafeMethod(mc) => {
                self.add_expression(parent, mc.object);
                self.add_arguments(parent, &mc.argument_list);
            }
            Call::StaticMethod(sc) => {
                self.add_expression(parent, sc.class);
                self.add_arguments(parent, &sc.argument_list);
            }
        }
    }

    pub(super) fn add_arguments(&mut self, parent: NodeId, argument_list: &'a ArgumentList<'a>) {
        for arg in argument_list.arguments.iter() {
            let value = match arg {
                Argument::Positional(pos) => pos.value,
                Argument::Named(named) => named.value,
            };
            self.add_expression(parent, value);
        }
    }

    fn add_array_elements(
        &mut self,
        parent: NodeId,
        elements: impl Iterator<Item = &'a ArrayElement<'a>>,
    ) {
        for elem in elements {
            match elem {
                ArrayElement::KeyValue(kv) => {
                    self.add_expression(parent, kv.key);
                    self.add_expression(parent, kv.value);
                }
                ArrayElement::Value(v) => self.add_expression(parent, v.value),
                ArrayElement::Variadic(v) => self.add_expression(parent, v.value),
                ArrayElement::Missing(_) => {}
            }
        }
    }
}
