pub mod batch;
pub mod etl;
pub mod gateway;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_utils;
