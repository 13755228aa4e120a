use async_fn_stream::{try_fn_stream, TryStreamEmitter};
use async_trait::async_trait;
use futures::Stream;
use crate::error::{ReconstructionError, Result};
use crate::message::ReconstructionMessage;

#[async_trait]
pub trait PipelineStream: Send {
    async fn run(&mut self, emitter: TryStreamEmitter<ReconstructionMessage, ReconstructionError>) -> Result<()>;

    fn launch(&mut self) -> impl Stream<Item = Result<ReconstructionMessage>> + Send + '_ {
        try_fn_stream(|emitter| async move {
            self.run(emitter).await?;
            Ok(())
        })
    }
}
