//! Terminal output channel

use async_trait::async_trait;

use super::{Channel, ChannelResult, DeliveryStatus};
use crate::notifications::Notification;

/// Prints notifications to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, notification: &Notification) -> ChannelResult<DeliveryStatus> {
        println!("\n{}\n", notification.format_message());
        Ok(DeliveryStatus::success("console"))
    }
}
