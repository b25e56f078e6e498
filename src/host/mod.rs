//! Dynamic renderer hosts
//!
//! Hosts bridge resolved metadata and live renderer children. A host receives
//! inputs (`target`, column or actions, row data, entity form), resolves a
//! renderer on first delivery, mounts it, and afterwards only patches it when
//! the inputs changed. A new target identity tears children down and resolves
//! again.
//!
//! ```text
//! Idle --deliver--> Resolving --load/instantiate--> Mounted
//!                                                    |  ^
//!                                          changed  v  | done
//!                                                  Patching
//! ```
//!
//! - [`ColumnRendererHost`] hosts one column renderer
//! - [`ActionRendererHost`] hosts every action of a view
//! - [`SectionView`] and [`ObjectView`] assemble hosts for a whole target

mod action;
mod column;
mod view;

pub use action::{ActionInput, ActionRendererHost};
pub use column::{ColumnRendererHost, HostInput, HostState, HostStats, UpdateOutcome};
pub use view::{ObjectView, RenderedObject, RenderedTab, SectionView};
