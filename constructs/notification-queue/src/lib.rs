//! Notification queue construct
//!
//! Declares an SQS queue and an SNS topic, subscribes the queue to the
//! topic, and exposes the queue's ARN token. Pure manifest synthesis; no
//! AWS calls are made.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

use manifest::{ManifestResult, Stack};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Queue visibility timeout applied when none is configured, in seconds
pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: i64 = 300;

/// Configuration for [`NotificationQueue`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationQueueProps {
    /// Visibility timeout for the SQS queue, in seconds
    ///
    /// Defaults to 300 seconds when absent. The value is passed through to
    /// the queue declaration unvalidated; the provisioning engine rejects
    /// invalid durations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility_timeout_seconds: Option<i64>,
}

/// An SQS queue subscribed to an SNS topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationQueue {
    /// ARN token of the declared queue, resolved by the provisioning engine
    pub queue_arn: String,
}

impl NotificationQueue {
    /// Declares the queue, the topic and the subscription linking them
    ///
    /// Child logical ids are prefixed with `id`, so multiple instances can
    /// share a stack as long as their ids are distinct.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::DuplicateLogicalId` if a child logical id is
    /// already declared in the stack
    pub fn build(
        stack: &mut Stack,
        id: &str,
        props: &NotificationQueueProps,
    ) -> ManifestResult<Self> {
        let queue_id = format!("{id}Queue");
        let topic_id = format!("{id}Topic");

        let visibility_timeout = props
            .visibility_timeout_seconds
            .unwrap_or(DEFAULT_VISIBILITY_TIMEOUT_SECS);

        stack.add_resource(
            &queue_id,
            "AWS::SQS::Queue",
            json!({ "VisibilityTimeout": visibility_timeout }),
        )?;

        stack.add_resource(&topic_id, "AWS::SNS::Topic", json!({}))?;

        let queue_arn = Stack::get_att(&queue_id, "Arn");

        stack.add_resource(
            &format!("{id}Subscription"),
            "AWS::SNS::Subscription",
            json!({
                "Protocol": "sqs",
                "TopicArn": Stack::reference(&topic_id),
                "Endpoint": queue_arn,
            }),
        )?;

        tracing::debug!(construct_id = id, "declared notification queue");

        Ok(Self { queue_arn })
    }
}
