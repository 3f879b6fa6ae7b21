//! Adapts a `domain_messages::RelayerJob` to the scheduler's `Job` trait.

use async_trait::async_trait;
use domain_messages::{MessageRepository, RelayerJob, UpstreamSender};
use tokio_util::sync::CancellationToken;

use crate::scheduler::Job;

#[async_trait]
impl<R, S> Job for RelayerJob<R, S>
where
    R: MessageRepository + Send + Sync + 'static,
    S: UpstreamSender + Send + Sync + 'static,
{
    async fn run(&self, ctx: CancellationToken) -> eyre::Result<()> {
        RelayerJob::run(self, ctx)
            .await
            .map_err(|e| eyre::eyre!(e.to_string()))
    }
}
