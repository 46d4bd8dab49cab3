//! Creator credits: cleaning extracted strings, merging the two images'
//! credits into one caption, and tracking both sides through a session.

mod merge;
mod normalize;
mod session;

pub use merge::{AGENCY_SUFFIXES, common_agency_suffix, merge};
pub use normalize::clean;
pub use session::{
    CaptionPolicy, Completion, CreatorMetadata, CreatorSource, LoadTicket, Session, Side,
};
