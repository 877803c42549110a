//! Chat commands for inspecting and updating personas.
//!
//! Three commands are understood, each with an ASCII alias and an optional
//! leading `/`:
//!
//! | Command | Alias | Effect |
//! |---|---|---|
//! | `人格详情 <id>` | `persona_detail` | show one persona |
//! | `人格列表` | `persona_list` | show every persona |
//! | `人格更新 <id> <requirement>` | `persona_update` | run the update agent |

pub mod error;
pub mod handler;
pub mod parse;

pub use error::CommandError;
pub use handler::PersonaCommands;
pub use parse::{parse_command, parse_update_command, Command};
