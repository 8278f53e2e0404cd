// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Map precompile pass for puzzle items.

The pass loads a map of placed instances and their connections, runs the
condition list over every instance, then links marked items into chains and
applies per-position logic and endcap rotation.

Modules:
- `map`: serialisable instances, links and indicator records.
- `connections`: item/connection arenas built from the map.
- `item_chain`: groups linked nodes into ordered chains.
- `conditions`: flags, results and the priority-ordered engine.
- `user_errors`: diagnostics meant for the level author.
"]

pub mod conditions;
pub mod connections;
pub mod context;
pub mod item_chain;
pub mod map;
pub mod user_errors;

pub use conditions::{ConditionDef, ConditionError, Conditions, ConditionsFile};
pub use context::CompileContext;
pub use map::{Fixups, Instance, Map};
pub use user_errors::{UserError, UserErrorKind};
