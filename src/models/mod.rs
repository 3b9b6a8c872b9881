pub mod segment;
pub mod selector;
pub mod time;

pub use segment::{AirportRef, AirportType, CountryRef, FlightSegment, RegionRef, SegmentChain};
pub use selector::AirportSelector;
pub use time::TimeWindow;
