//! Pure data transforms exposed to policy expressions
//!
//! Nothing in this module touches the active filter or the network. Each transform is
//! written against plain Rust types first and then, where the evaluator needs it, wrapped
//! into a CEL-facing function that accepts and returns [`cel_interpreter::Value`].
//!
//! Two failure styles coexist:
//!
//! - soft misses produce `null`: a missing tag key, a malformed marked-for-op tag, an
//!   unparseable CIDR, an unparseable schedule;
//! - malformed structural input is an error: an ARN without the `arn` prefix.

mod arn;
mod cidr;
mod collections;
mod schedule;
mod tags;
mod text;
mod version;

pub use arn::{Arn, ArnField, arn_split};
pub use cidr::{Cidr, IpNetwork, cidr_contains, parse_cidr, size_parse_cidr};
pub use collections::{absent, difference, intersect, present, unique_size};
pub use schedule::{ParsedSchedule, ScheduleEntry, TimeSpec, flatten_schedule, parse_schedule};
pub use tags::{key, marked_key};
pub use text::{glob, normalize};
pub use version::Version;
