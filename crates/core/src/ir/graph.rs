//! Dependency resolution between declarations.
//!
//! A converter may reference other named converters; those must already be
//! registered when the referencing statement runs. This module extracts the
//! named references of a type expression, builds a name -> dependencies map
//! over the declaration list, and orders the declarations so every
//! dependency precedes its dependent, rejecting cycles.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::types::{Declaration, TypeExpr};
use crate::error::Error;

/// Named declarations referenced by a type expression.
///
/// Generic containers other than sequence/record are handled as the
/// unconstrained converter, so their element types contribute nothing.
pub fn type_references(idl_type: &TypeExpr) -> IndexSet<String> {
    let mut refs = IndexSet::new();
    collect_references(idl_type, &mut refs);
    refs
}

fn collect_references(idl_type: &TypeExpr, refs: &mut IndexSet<String>) {
    match idl_type {
        TypeExpr::Nullable(inner) | TypeExpr::Sequence(inner) => {
            collect_references(inner, refs);
        }
        TypeExpr::Record(key, value) => {
            collect_references(key, refs);
            collect_references(value, refs);
        }
        TypeExpr::Union(members) => {
            for member in members {
                collect_references(member, refs);
            }
        }
        TypeExpr::Any => {}
        TypeExpr::Named(named) => {
            refs.insert(named.name.clone());
        }
    }
}

#[derive(Debug)]
struct Node {
    deps: IndexSet<String>,
    /// Index into the declaration arena.
    decl: usize,
}

/// Declarations keyed by name with their dependency sets.
///
/// Map order matches declaration order in the input; that order is the
/// tie-break for the sorter when no dependency forces reordering.
#[derive(Debug)]
pub struct DependencyGraph {
    arena: Vec<Declaration>,
    nodes: IndexMap<String, Node>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl DependencyGraph {
    /// Build the dependency map from a declaration list.
    ///
    /// Interfaces and enums have no dependencies: the converters they
    /// reference (primitives, interface objects) are always pre-registered
    /// by the runtime. Partial interfaces are not inserted at all.
    /// Dictionary inheritance is also not an edge; only member types count.
    pub fn build(declarations: Vec<Declaration>) -> DependencyGraph {
        let mut arena = Vec::with_capacity(declarations.len());
        let mut nodes = IndexMap::new();

        for decl in declarations {
            let deps = match &decl {
                Declaration::Interface(iface) => {
                    if iface.partial {
                        continue;
                    }
                    IndexSet::new()
                }
                Declaration::Enum(_) => IndexSet::new(),
                Declaration::Dictionary(dict) => {
                    let mut deps = IndexSet::new();
                    for member in &dict.members {
                        collect_references(&member.idl_type, &mut deps);
                    }
                    deps
                }
                Declaration::Typedef(typedef) => type_references(&typedef.idl_type),
            };
            let index = arena.len();
            nodes.insert(decl.name().to_string(), Node { deps, decl: index });
            arena.push(decl);
        }

        DependencyGraph { arena, nodes }
    }

    /// Order the declarations so every dependency precedes its dependent.
    ///
    /// Depth-first over the keys in insertion order, with three marks per
    /// node: entering a node marks it in-progress, finishing marks it done
    /// and appends it to the output. Hitting an in-progress node while
    /// resolving dependencies means the declarations can never all be
    /// satisfied; that fails the run immediately. Dependency names not in
    /// the map (primitive types, referenced interfaces) are skipped.
    pub fn sort(self) -> Result<Vec<Declaration>, Error> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        for index in 0..self.nodes.len() {
            self.visit(index, &mut marks, &mut order)?;
        }

        debug!(
            order = ?order
                .iter()
                .filter_map(|&index| self.nodes.get_index(index).map(|(name, _)| name.as_str()))
                .collect::<Vec<_>>(),
            "resolved declaration order"
        );

        let mut slots: Vec<Option<Declaration>> =
            self.arena.into_iter().map(Some).collect();
        let sorted = order
            .into_iter()
            .filter_map(|index| {
                self.nodes
                    .get_index(index)
                    .and_then(|(_, node)| slots[node.decl].take())
            })
            .collect();
        Ok(sorted)
    }

    fn visit(
        &self,
        index: usize,
        marks: &mut [Mark],
        order: &mut Vec<usize>,
    ) -> Result<(), Error> {
        let Some((name, node)) = self.nodes.get_index(index) else {
            return Ok(());
        };
        match marks[index] {
            Mark::Done => Ok(()),
            Mark::InProgress => Err(Error::CircularDependency(name.clone())),
            Mark::Unvisited => {
                marks[index] = Mark::InProgress;
                for dep in &node.deps {
                    if let Some(dep_index) = self.nodes.get_index_of(dep.as_str()) {
                        self.visit(dep_index, marks, order)?;
                    }
                }
                marks[index] = Mark::Done;
                order.push(index);
                Ok(())
            }
        }
    }

    #[cfg(test)]
    fn deps_of(&self, name: &str) -> Vec<&str> {
        self.nodes
            .get(name)
            .map(|node| node.deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::{
        DictionaryDecl, EnumDecl, InterfaceDecl, Member, NamedType, TypedefDecl,
    };

    fn interface(name: &str) -> Declaration {
        Declaration::Interface(InterfaceDecl {
            name: name.to_string(),
            partial: false,
        })
    }

    fn partial_interface(name: &str) -> Declaration {
        Declaration::Interface(InterfaceDecl {
            name: name.to_string(),
            partial: true,
        })
    }

    fn typedef(name: &str, idl_type: TypeExpr) -> Declaration {
        Declaration::Typedef(TypedefDecl {
            name: name.to_string(),
            idl_type,
        })
    }

    fn dictionary(name: &str, member_types: &[(&str, TypeExpr)]) -> Declaration {
        Declaration::Dictionary(DictionaryDecl {
            name: name.to_string(),
            inheritance: None,
            members: member_types
                .iter()
                .map(|(member_name, idl_type)| Member {
                    name: member_name.to_string(),
                    idl_type: idl_type.clone(),
                    required: false,
                    default: None,
                })
                .collect(),
        })
    }

    fn names(declarations: &[Declaration]) -> Vec<&str> {
        declarations.iter().map(Declaration::name).collect()
    }

    #[test]
    fn test_references_of_named_type() {
        let refs = type_references(&TypeExpr::named("Point"));
        assert_eq!(refs.len(), 1);
        assert!(refs.contains("Point"));
    }

    #[test]
    fn test_references_of_record_cover_key_and_value() {
        let record = TypeExpr::Record(
            Box::new(TypeExpr::named("DOMString")),
            Box::new(TypeExpr::named("Point")),
        );
        let refs = type_references(&record);
        assert_eq!(
            refs.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["DOMString", "Point"]
        );
    }

    #[test]
    fn test_references_of_union_cover_all_members() {
        let union = TypeExpr::Union(vec![
            TypeExpr::named("Point"),
            TypeExpr::Sequence(Box::new(TypeExpr::named("Line"))),
        ]);
        let refs = type_references(&union);
        assert_eq!(
            refs.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Point", "Line"]
        );
    }

    #[test]
    fn test_opaque_generic_adds_no_references() {
        assert!(type_references(&TypeExpr::Any).is_empty());
        assert!(type_references(&TypeExpr::Nullable(Box::new(TypeExpr::Any))).is_empty());
    }

    #[test]
    fn test_interfaces_and_enums_have_no_deps() {
        let graph = DependencyGraph::build(vec![
            interface("Window"),
            Declaration::Enum(EnumDecl {
                name: "Color".to_string(),
                values: vec!["red".to_string()],
            }),
        ]);
        assert!(graph.deps_of("Window").is_empty());
        assert!(graph.deps_of("Color").is_empty());
    }

    #[test]
    fn test_partial_interfaces_are_excluded() {
        let graph =
            DependencyGraph::build(vec![partial_interface("Window"), interface("Screen")]);
        let sorted = graph.sort().unwrap();
        assert_eq!(names(&sorted), vec!["Screen"]);
    }

    #[test]
    fn test_inheritance_is_not_an_edge() {
        let mut child = dictionary("Child", &[("x", TypeExpr::named("long"))]);
        if let Declaration::Dictionary(dict) = &mut child {
            dict.inheritance = Some("Parent".to_string());
        }
        let graph = DependencyGraph::build(vec![child, dictionary("Parent", &[])]);
        assert!(graph.deps_of("Child").iter().all(|dep| *dep != "Parent"));
    }

    #[test]
    fn test_sort_keeps_declaration_order_without_edges() {
        let graph = DependencyGraph::build(vec![
            interface("B"),
            interface("A"),
            interface("C"),
        ]);
        let sorted = graph.sort().unwrap();
        assert_eq!(names(&sorted), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_puts_dependency_first() {
        let declarations = vec![
            typedef("Points", TypeExpr::Sequence(Box::new(TypeExpr::named("Point")))),
            dictionary("Point", &[("x", TypeExpr::named("double"))]),
        ];
        let sorted = DependencyGraph::build(declarations).sort().unwrap();
        assert_eq!(names(&sorted), vec!["Point", "Points"]);
    }

    #[test]
    fn test_sort_is_total_and_duplicate_free() {
        let declarations = vec![
            typedef("A", TypeExpr::named("B")),
            typedef("B", TypeExpr::named("C")),
            interface("C"),
            dictionary("D", &[("a", TypeExpr::named("A")), ("b", TypeExpr::named("B"))]),
        ];
        let sorted = DependencyGraph::build(declarations).sort().unwrap();
        assert_eq!(sorted.len(), 4);
        let mut seen = names(&sorted);
        seen.sort_unstable();
        assert_eq!(seen, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let declarations = vec![
            dictionary("D", &[("a", TypeExpr::named("A"))]),
            typedef("A", TypeExpr::named("C")),
            interface("C"),
            interface("B"),
        ];
        let first = DependencyGraph::build(declarations.clone()).sort().unwrap();
        let second = DependencyGraph::build(declarations).sort().unwrap();
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), vec!["C", "A", "D", "B"]);
    }

    #[test]
    fn test_unknown_dependency_names_are_skipped() {
        let declarations = vec![typedef(
            "Flags",
            TypeExpr::Record(
                Box::new(TypeExpr::named("DOMString")),
                Box::new(TypeExpr::named("boolean")),
            ),
        )];
        let sorted = DependencyGraph::build(declarations).sort().unwrap();
        assert_eq!(names(&sorted), vec!["Flags"]);
    }

    #[test]
    fn test_direct_cycle_is_rejected() {
        let declarations = vec![
            typedef("A", TypeExpr::named("B")),
            typedef("B", TypeExpr::named("A")),
        ];
        let err = DependencyGraph::build(declarations).sort().unwrap_err();
        assert!(matches!(err, Error::CircularDependency(_)));
    }

    #[test]
    fn test_indirect_cycle_is_rejected() {
        // Length-3 cycle: the two-state scheme this replaces never
        // terminated on these.
        let declarations = vec![
            typedef("A", TypeExpr::named("B")),
            typedef("B", TypeExpr::named("C")),
            typedef("C", TypeExpr::named("A")),
        ];
        let err = DependencyGraph::build(declarations).sort().unwrap_err();
        match err {
            Error::CircularDependency(name) => {
                assert!(["A", "B", "C"].contains(&name.as_str()));
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle_is_rejected() {
        let declarations = vec![typedef(
            "Selfish",
            TypeExpr::Sequence(Box::new(TypeExpr::named("Selfish"))),
        )];
        let err = DependencyGraph::build(declarations).sort().unwrap_err();
        match err {
            Error::CircularDependency(name) => assert_eq!(name, "Selfish"),
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_union_members_force_ordering() {
        let declarations = vec![
            typedef(
                "PointOrLine",
                TypeExpr::Union(vec![TypeExpr::named("Point"), TypeExpr::named("Line")]),
            ),
            dictionary("Line", &[("start", TypeExpr::named("Point"))]),
            dictionary("Point", &[("x", TypeExpr::named("double"))]),
        ];
        let sorted = DependencyGraph::build(declarations).sort().unwrap();
        assert_eq!(names(&sorted), vec!["Point", "Line", "PointOrLine"]);
    }

    #[test]
    fn test_modifier_attrs_do_not_affect_references() {
        let named = TypeExpr::Named(NamedType {
            name: "long".to_string(),
            ext_attrs: vec!["Clamp".to_string()],
            parent_ext_attrs: Vec::new(),
        });
        let refs = type_references(&named);
        assert_eq!(refs.iter().map(String::as_str).collect::<Vec<_>>(), vec!["long"]);
    }
}
