//! Stats module - aggregation and crime rates

mod aggregator;
mod rate;

pub use aggregator::{
    AggregateRecord, AggregateValue, Aggregation, Aggregator, GroupField, GroupKey, Reduction,
};
pub use rate::{crime_rate, RateScale, ScaledRate, SCALE_PERCENTILE};
