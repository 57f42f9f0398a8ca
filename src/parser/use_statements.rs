/// `use` statement extraction.
///
/// Builds the list of class imports a `use` statement introduces, each
/// mapping a short (imported) name to its fully-qualified equivalent.
/// Function and constant imports do not affect class name resolution and
/// are skipped.
use mago_syntax::ast::*;

use crate::syntax::Import;
use crate::util::short_name;

use super::TreeBuilder;

impl<'a> TreeBuilder<'a> {
    /// Extract the class imports of a `UseItems` node.
    ///
    /// Handles:
    ///   - Simple use: `use Foo\Bar;`
    ///   - Aliased use: `use Foo\Bar as Baz;`
    ///   - Grouped use: `use Foo\{Bar, Baz};`
    ///   - Mixed grouped use: `use Foo\{Bar, function baz, const QUX};`
    pub(super) fn extract_use_items(items: &UseItems) -> Vec<Import> {
        let mut imports = Vec::new();
        match items {
            UseItems::Sequence(seq) => {
                for item in seq.items.iter() {
                    imports.push(Self::import_for(item, None));
                }
            }
            UseItems::TypedSequence(seq) => {
                if seq.r#type.is_function() || seq.r#type.is_const() {
                    return imports;
                }
                for item in seq.items.iter() {
                    imports.push(Self::import_for(item, None));
                }
            }
            UseItems::TypedList(list) => {
                if list.r#type.is_function() || list.r#type.is_const() {
                    return imports;
                }
                let prefix = list.namespace.value();
                for item in list.items.iter() {
                    imports.push(Self::import_for(item, Some(prefix)));
                }
            }
            UseItems::MixedList(list) => {
                let prefix = list.namespace.value();
                for maybe_typed in list.items.iter() {
                    if let Some(ref t) = maybe_typed.r#type
                        && (t.is_function() || t.is_const())
                    {
                        continue;
                    }
                    imports.push(Self::import_for(&maybe_typed.item, Some(prefix)));
                }
            }
        }
        imports
    }

    /// Build the import for a single `UseItem`.
    ///
    /// If `group_prefix` is `Some`, the item name is relative to that prefix
    /// (e.g. for `use Foo\{Bar}`, prefix is `"Foo"` and item name is `"Bar"`,
    /// giving FQN `"Foo\Bar"`).
    fn import_for(item: &UseItem, group_prefix: Option<&str>) -> Import {
        let item_name = item.name.value().trim_start_matches('\\');

        let fqn = if let Some(prefix) = group_prefix {
            format!("{}\\{}", prefix.trim_start_matches('\\'), item_name)
        } else {
            item_name.to_string()
        };

        let alias = if let Some(ref alias) = item.alias {
            alias.identifier.value.to_string()
        } else {
            short_name(&fqn).to_string()
        };

        Import { alias, fqn }
    }
}
