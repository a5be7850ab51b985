pub mod campaign_dispatch;
pub mod campaign_lifecycle;
pub mod dispatch_registry;

#[cfg(test)]
pub mod test_support;
