//! Pipeline orchestration
//!
//! Sequences the stages in dependency order and merges each stage's
//! update through the single reducer. Interviews fan out across personas
//! bounded by `max_concurrent_interviews`; a failed interview aborts
//! only that persona.

use crate::article;
use crate::context::ResearchContext;
use crate::index::ReferenceIndexer;
use crate::init::OutlineInitializer;
use crate::interview::InterviewRunner;
use crate::refine::OutlineRefiner;
use crate::sections::SectionWriter;
use crate::state::{InterviewState, ResearchState, StateUpdate, reduce};
use futures::StreamExt;
use futures::stream;
use tracing::{info, warn};
use wikismith_kernel::{PipelineError, PipelineResult};

/// The full research pipeline for one topic.
pub struct ResearchPipeline {
    ctx: ResearchContext,
}

impl ResearchPipeline {
    /// Create a pipeline over the given context.
    pub fn new(ctx: ResearchContext) -> Self {
        Self { ctx }
    }

    /// The pipeline's context.
    pub fn context(&self) -> &ResearchContext {
        &self.ctx
    }

    /// Run every stage and return the final state.
    pub async fn run(&self, topic: &str) -> PipelineResult<ResearchState> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::invalid_input("topic must not be empty"));
        }

        let mut state = ResearchState::new(topic);

        // initialize_research
        let (outline, editors) = OutlineInitializer::new(&self.ctx).run(topic).await?;
        reduce(
            &mut state,
            StateUpdate::ResearchInitialized { outline, editors },
        );

        // conduct_interviews
        let interviews = self.conduct_interviews(topic, &state).await?;
        reduce(&mut state, StateUpdate::InterviewsCompleted(interviews));

        // refine_outline
        let old_outline = state
            .outline
            .clone()
            .ok_or_else(|| PipelineError::invalid_input("outline missing after initialization"))?;
        let refined = OutlineRefiner::new(&self.ctx)
            .run(topic, &old_outline, &state.interviews)
            .await?;
        reduce(&mut state, StateUpdate::OutlineRefined(refined));

        // index_references
        let indexed = ReferenceIndexer::new(&self.ctx).run(&state.interviews).await?;
        reduce(&mut state, StateUpdate::ReferencesIndexed { indexed });

        // write_sections
        let refined_outline = state
            .outline
            .clone()
            .ok_or_else(|| PipelineError::invalid_input("outline missing after refinement"))?;
        let sections = SectionWriter::new(&self.ctx)
            .run(topic, &refined_outline)
            .await?;
        reduce(&mut state, StateUpdate::SectionsWritten(sections));

        // write_article
        let assembled = article::assemble(topic, &refined_outline, &state.sections);
        reduce(&mut state, StateUpdate::ArticleAssembled(assembled));

        info!(%topic, "research pipeline finished");
        Ok(state)
    }

    /// Run one interview per editor, bounded by the concurrency flag.
    ///
    /// A persona whose interview errors is dropped with a warning; the
    /// stage fails only when every interview failed.
    async fn conduct_interviews(
        &self,
        topic: &str,
        state: &ResearchState,
    ) -> PipelineResult<Vec<InterviewState>> {
        let concurrency = self.ctx.config.max_concurrent_interviews.max(1);
        let runner = InterviewRunner::new(&self.ctx);

        info!(
            editors = state.editors.len(),
            concurrency, "conducting interviews"
        );

        let outcomes: Vec<(String, PipelineResult<InterviewState>)> =
            stream::iter(state.editors.iter().map(|editor| {
                let runner = &runner;
                async move { (editor.name.clone(), runner.run(topic, editor).await) }
            }))
            .buffered(concurrency)
            .collect()
            .await;

        let mut interviews = Vec::new();
        for (editor, outcome) in outcomes {
            match outcome {
                Ok(interview) => interviews.push(interview),
                Err(error) => {
                    warn!(%editor, %error, "interview aborted");
                }
            }
        }

        if interviews.is_empty() && !state.editors.is_empty() {
            return Err(PipelineError::stage(
                "conduct_interviews",
                "every interview failed",
            ));
        }
        Ok(interviews)
    }
}
