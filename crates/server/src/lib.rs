pub mod api;
pub mod metrics;
pub mod state;

#[cfg(test)]
mod test_support;
