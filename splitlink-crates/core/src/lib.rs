//! # Splitlink
//! Splitlink decides how the events of a timetabling instance are split into segments, and
//! which events should run within which, before any times are assigned. The result is a tree
//! of assignment nodes: the root node holds the segments of the cycle, and every event has a
//! node below the node of the event (or the cycle) it will be assigned to.
//!
//! The decisions are taken on a [`forest::SplitForest`]. Each constraint of the instance is
//! turned into a job which adds requirements to the forest; a requirement which would make
//! the splits of some event impossible is refused, so the order of the jobs matters. Jobs of
//! required and heavily weighted constraints come first.
//!
//! # Example
//! ```rust
//! # use splitlink_core::layer_tree::build_layer_tree;
//! # use splitlink_core::model::Constraint;
//! # use splitlink_core::model::ConstraintKind;
//! # use splitlink_core::model::Event;
//! # use splitlink_core::model::EventSelection;
//! # use splitlink_core::model::InstanceBuilder;
//! # use splitlink_core::model::Solution;
//! # use splitlink_core::model::Timetable;
//! # use splitlink_core::options::LayerTreeOptions;
//! let mut builder = InstanceBuilder::new(10);
//! let maths = builder.add_event(Event::new("maths", 4));
//! let _ = builder.add_constraint(Constraint {
//!     name: "double lessons".to_owned(),
//!     required: true,
//!     weight: 1,
//!     kind: ConstraintKind::DistributeSplitEvents {
//!         applies_to: EventSelection {
//!             events: vec![maths],
//!             event_groups: Vec::new(),
//!         },
//!         duration: 2,
//!         minimum: 2,
//!         maximum: 2,
//!     },
//! });
//! let instance = builder.build();
//!
//! let mut solution = Solution::new(&instance);
//! let root = build_layer_tree(&instance, &mut solution, LayerTreeOptions::default())
//!     .expect("a fresh solution has no nodes");
//!
//! // The cycle node holds one node, for the two segments of maths.
//! let children = solution.node_children(root);
//! assert_eq!(children.len(), 1);
//! assert_eq!(solution.node_segments(children[0]).len(), 2);
//! ```
pub mod asserts;
pub mod basic_types;
pub mod containers;
pub mod forest;
pub mod jobs;
pub mod layer_tree;
pub mod model;
pub mod options;
pub mod statistics;

pub use convert_case;

pub use crate::forest::SplitForest;
pub use crate::layer_tree::build_layer_tree;
pub use crate::layer_tree::build_layer_tree_with_statistics;
pub use crate::layer_tree::LayerTreeError;
pub use crate::options::LayerTreeOptions;
