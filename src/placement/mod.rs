//! Widget placement: ordering keys, numeric collation and order-preserving
//! insertion into section containers.

mod core;

pub use core::{
    OrderingKey, PlacementOutcome, compare_keys, insertion_index, numeric_collate, place,
};
