//! End-to-end briefing pipeline: inputs → search → context → industry →
//! strategy → executive brief.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use meetingprep_generation::{ChatCompletionsClient, ChatOptions, Generation, TextGenerator};
use meetingprep_search::{SearchProvider, TavilyClient, TavilyOptions, company_news};
use meetingprep_shared::{
    AppConfig, CredentialOverrides, DerivedField, MeetingInputs, MeetingState, Result, StepUsage,
    resolve_credentials,
};

use crate::prompts;

/// Number of generation steps in a run.
const STEP_COUNT: usize = DerivedField::ALL.len();

/// Result of a completed run.
#[derive(Debug)]
pub struct PrepareResult {
    /// Fully populated session state.
    pub state: MeetingState,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Prompt tokens across all steps.
    pub total_tokens_in: u64,
    /// Completion tokens across all steps.
    pub total_tokens_out: u64,
}

impl PrepareResult {
    /// The executive brief, verbatim.
    pub fn brief(&self) -> &str {
        self.state.executive_brief().unwrap_or_default()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a generation step sends its prompt.
    fn step_started(&self, field: DerivedField, current: usize, total: usize);
    /// Called after a generation step stored its output.
    fn step_finished(&self, field: DerivedField, generation: &Generation);
    /// Called when the pipeline completes.
    fn done(&self, result: &PrepareResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn step_started(&self, _field: DerivedField, _current: usize, _total: usize) {}
    fn step_finished(&self, _field: DerivedField, _generation: &Generation) {}
    fn done(&self, _result: &PrepareResult) {}
}

/// The search and generation services a run talks to.
pub struct MeetingPipeline {
    search: Box<dyn SearchProvider>,
    generator: Box<dyn TextGenerator>,
}

impl MeetingPipeline {
    pub fn new(search: Box<dyn SearchProvider>, generator: Box<dyn TextGenerator>) -> Self {
        Self { search, generator }
    }

    /// Resolve both API keys and build the HTTP clients.
    ///
    /// Fails with a config error before any client exists if either key is
    /// missing, so no request can be sent without credentials.
    pub fn from_config(config: &AppConfig, overrides: &CredentialOverrides) -> Result<Self> {
        let credentials = resolve_credentials(config, overrides)?;

        let search = TavilyClient::new(
            credentials.search_api_key(),
            TavilyOptions::from(&config.search),
        )?;
        let generator = ChatCompletionsClient::new(
            credentials.generation_api_key(),
            ChatOptions::from(&config.generation),
        )?;

        Ok(Self::new(Box::new(search), Box::new(generator)))
    }

    /// Run the full pipeline for one form submission.
    ///
    /// 1. Validate inputs
    /// 2. Search recent company news
    /// 3. Context analysis
    /// 4. Industry insights
    /// 5. Strategy
    /// 6. Executive brief
    ///
    /// Any failure aborts the run; later steps never execute.
    #[instrument(skip_all, fields(company = %inputs.company_name, model = self.generator.model()))]
    pub async fn run(
        &self,
        inputs: MeetingInputs,
        progress: &dyn ProgressReporter,
    ) -> Result<PrepareResult> {
        inputs.validate()?;

        let start = Instant::now();
        let mut state = MeetingState::new(inputs);

        info!(session = %state.session_id(), "starting meeting preparation");

        // --- Search ---
        progress.phase("Searching recent news");
        let news = company_news(self.search.as_ref(), &state.inputs().company_name).await?;
        state.record_search(news.query, news.text, news.result_count)?;

        // --- Step 1: Context ---
        let prompt = prompts::context_prompt(
            state.inputs(),
            state.search_context().unwrap_or_default(),
        );
        self.run_step(&mut state, DerivedField::ContextAnalysis, &prompt, progress)
            .await?;

        // --- Step 2: Industry ---
        let prompt = prompts::industry_prompt(
            &state.inputs().company_name,
            state.require(DerivedField::ContextAnalysis)?,
        );
        self.run_step(&mut state, DerivedField::IndustryInsights, &prompt, progress)
            .await?;

        // --- Step 3: Strategy ---
        let prompt = prompts::strategy_prompt(
            state.require(DerivedField::ContextAnalysis)?,
            state.require(DerivedField::IndustryInsights)?,
            state.inputs().meeting_duration,
            &state.inputs().focus_areas,
        );
        self.run_step(&mut state, DerivedField::Strategy, &prompt, progress)
            .await?;

        // --- Step 4: Brief ---
        let prompt = prompts::brief_prompt(
            &state.inputs().meeting_objective,
            &state.inputs().attendees,
            state.require(DerivedField::ContextAnalysis)?,
            state.require(DerivedField::IndustryInsights)?,
            state.require(DerivedField::Strategy)?,
        );
        self.run_step(&mut state, DerivedField::ExecutiveBrief, &prompt, progress)
            .await?;

        let (total_tokens_in, total_tokens_out) = state
            .usage()
            .iter()
            .fold((0, 0), |(i, o), u| (i + u.tokens_in, o + u.tokens_out));

        let result = PrepareResult {
            state,
            elapsed: start.elapsed(),
            total_tokens_in,
            total_tokens_out,
        };

        progress.done(&result);

        info!(
            session = %result.state.session_id(),
            tokens_in = result.total_tokens_in,
            tokens_out = result.total_tokens_out,
            elapsed_ms = result.elapsed.as_millis(),
            "meeting preparation complete"
        );

        Ok(result)
    }

    /// Send one prompt and store the reply under `field`.
    async fn run_step(
        &self,
        state: &mut MeetingState,
        field: DerivedField,
        prompt: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let index = DerivedField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or_default();
        progress.step_started(field, index + 1, STEP_COUNT);

        let generation = self.generator.generate(prompt).await?;
        progress.step_finished(field, &generation);

        info!(
            step = %field,
            tokens_in = generation.tokens_in,
            tokens_out = generation.tokens_out,
            latency_ms = generation.latency_ms,
            "step complete"
        );

        state.record_usage(StepUsage {
            field,
            model: generation.model,
            tokens_in: generation.tokens_in,
            tokens_out: generation.tokens_out,
            latency_ms: generation.latency_ms,
        });
        state.record(field, generation.text)
    }
}

/// Resolve credentials, build clients, and run one preparation.
pub async fn prepare_meeting(
    config: &AppConfig,
    overrides: &CredentialOverrides,
    inputs: MeetingInputs,
    progress: &dyn ProgressReporter,
) -> Result<PrepareResult> {
    let pipeline = MeetingPipeline::from_config(config, overrides)?;
    pipeline.run(inputs, progress).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use meetingprep_search::SearchHit;
    use meetingprep_shared::MeetingPrepError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn acme() -> MeetingInputs {
        MeetingInputs::new("Acme", "Q3 review", "Alice (CFO)\nBob (CTO)", 60, "budget")
    }

    /// Search stub returning fixed snippets and counting calls.
    struct StubSearch {
        snippets: Vec<&'static str>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl StubSearch {
        fn returning(snippets: Vec<&'static str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let stub = Self {
                snippets,
                fail: false,
                calls: Arc::clone(&calls),
            };
            (stub, calls)
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let (mut stub, calls) = Self::returning(vec![]);
            stub.fail = true;
            (stub, calls)
        }
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MeetingPrepError::Search("HTTP 500".into()));
            }
            Ok(self
                .snippets
                .iter()
                .map(|s| SearchHit {
                    title: String::new(),
                    url: String::new(),
                    content: (*s).into(),
                    score: None,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Generator that echoes its prompt, optionally failing on the Nth call.
    struct EchoGenerator {
        prompts: Arc<Mutex<Vec<String>>>,
        fail_on_call: Option<usize>,
    }

    impl EchoGenerator {
        fn new(fail_on_call: Option<usize>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let prompts = Arc::new(Mutex::new(Vec::new()));
            let generator = Self {
                prompts: Arc::clone(&prompts),
                fail_on_call,
            };
            (generator, prompts)
        }
    }

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, prompt: &str) -> Result<Generation> {
            let call = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len()
            };
            if self.fail_on_call == Some(call) {
                return Err(MeetingPrepError::Generation("HTTP 503".into()));
            }
            Ok(Generation {
                text: prompt.to_string(),
                model: "echo".into(),
                tokens_in: 10,
                tokens_out: 5,
                latency_ms: 1,
            })
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    /// Records the order of progress events.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn phase(&self, name: &str) {
            self.events.lock().unwrap().push(format!("phase:{name}"));
        }
        fn step_started(&self, field: DerivedField, current: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{field}:{current}/{total}"));
        }
        fn step_finished(&self, field: DerivedField, _generation: &Generation) {
            self.events.lock().unwrap().push(format!("finish:{field}"));
        }
        fn done(&self, _result: &PrepareResult) {
            self.events.lock().unwrap().push("done".into());
        }
    }

    #[tokio::test]
    async fn echo_run_carries_inputs_into_brief() {
        let (search, search_calls) = StubSearch::returning(vec!["Acme launched X"]);
        let (generator, prompts) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));

        let result = pipeline.run(acme(), &SilentProgress).await.unwrap();

        assert!(result.state.is_complete());
        let brief = result.brief();
        assert!(brief.contains("Acme"));
        assert!(brief.contains("Q3 review"));
        assert!(brief.contains("budget"));
        assert!(brief.contains("Acme launched X"));

        assert_eq!(search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(prompts.lock().unwrap().len(), 4);
        assert_eq!(result.total_tokens_in, 40);
        assert_eq!(result.total_tokens_out, 20);
        assert_eq!(result.state.usage().len(), 4);
        assert_eq!(result.state.search_query(), Some("Acme recent news"));
    }

    #[tokio::test]
    async fn steps_run_in_dependency_order() {
        let (search, _) = StubSearch::returning(vec!["Acme launched X"]);
        let (generator, prompts) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));

        let result = pipeline.run(acme(), &SilentProgress).await.unwrap();
        let prompts = prompts.lock().unwrap();

        assert!(prompts[0].starts_with("You are a Meeting Context Specialist."));
        assert!(prompts[1].starts_with("You are an Industry Expert."));
        assert!(prompts[2].starts_with("You are a Meeting Strategist."));
        assert!(prompts[3].starts_with("You are a Communication Specialist."));

        // Each prompt embeds the output of the step before it.
        assert!(prompts[1].contains(&prompts[0]));
        assert!(prompts[2].contains(&prompts[1]));
        assert!(prompts[3].contains(&prompts[2]));

        assert_eq!(
            result.state.get(DerivedField::Strategy),
            Some(prompts[2].as_str())
        );
        for section in prompts::BRIEF_SECTIONS {
            assert!(prompts[3].contains(section));
        }
    }

    #[tokio::test]
    async fn failing_step_stops_later_steps() {
        let (search, _) = StubSearch::returning(vec!["Acme launched X"]);
        let (generator, prompts) = EchoGenerator::new(Some(2));
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));
        let progress = RecordingProgress::default();

        let err = pipeline.run(acme(), &progress).await.unwrap_err();

        assert!(matches!(err, MeetingPrepError::Generation(_)));
        assert_eq!(prompts.lock().unwrap().len(), 2);

        let events = progress.events.lock().unwrap();
        assert!(!events.iter().any(|e| e.starts_with("start:strategy")));
        assert!(!events.contains(&"done".to_string()));
    }

    #[tokio::test]
    async fn search_failure_skips_generation() {
        let (search, search_calls) = StubSearch::failing();
        let (generator, prompts) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));

        let err = pipeline.run(acme(), &SilentProgress).await.unwrap_err();

        assert!(matches!(err, MeetingPrepError::Search(_)));
        assert_eq!(search_calls.load(Ordering::SeqCst), 1);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_search_still_runs() {
        let (search, _) = StubSearch::returning(vec![]);
        let (generator, prompts) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));

        let result = pipeline.run(acme(), &SilentProgress).await.unwrap();

        assert!(result.state.is_complete());
        assert_eq!(result.state.search_result_count(), 0);
        assert_eq!(prompts.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn invalid_duration_makes_no_calls() {
        let (search, search_calls) = StubSearch::returning(vec!["Acme launched X"]);
        let (generator, prompts) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));

        let mut inputs = acme();
        inputs.meeting_duration = 200;
        let err = pipeline.run(inputs, &SilentProgress).await.unwrap_err();

        assert!(matches!(err, MeetingPrepError::Validation { .. }));
        assert_eq!(search_calls.load(Ordering::SeqCst), 0);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn progress_reports_each_step() {
        let (search, _) = StubSearch::returning(vec!["Acme launched X"]);
        let (generator, _) = EchoGenerator::new(None);
        let pipeline = MeetingPipeline::new(Box::new(search), Box::new(generator));
        let progress = RecordingProgress::default();

        pipeline.run(acme(), &progress).await.unwrap();

        let events = progress.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "phase:Searching recent news",
                "start:context_analysis:1/4",
                "finish:context_analysis",
                "start:industry_insights:2/4",
                "finish:industry_insights",
                "start:strategy:3/4",
                "finish:strategy",
                "start:executive_brief:4/4",
                "finish:executive_brief",
                "done",
            ]
        );
    }

    // -----------------------------------------------------------------------
    // HTTP-backed runs
    // -----------------------------------------------------------------------

    fn config_for(search: &MockServer, generation: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.search.base_url = search.uri();
        config.generation.base_url = generation.uri();
        // Unique env var names so the host environment cannot leak keys in.
        config.search.api_key_env = "MP_TEST_PIPELINE_SEARCH_KEY_4417".into();
        config.generation.api_key_env = "MP_TEST_PIPELINE_GEN_KEY_4417".into();
        config
    }

    #[tokio::test]
    async fn missing_credentials_send_no_requests() {
        let search_server = MockServer::start().await;
        let generation_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&search_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&generation_server)
            .await;

        let config = config_for(&search_server, &generation_server);
        let overrides = CredentialOverrides {
            search_api_key: Some("tvly-test".into()),
            generation_api_key: None,
        };

        let err = prepare_meeting(&config, &overrides, acme(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, MeetingPrepError::Config { .. }));
        assert!(err.to_string().contains("MP_TEST_PIPELINE_GEN_KEY_4417"));
    }

    #[tokio::test]
    async fn full_run_against_mock_services() {
        let search_server = MockServer::start().await;
        let generation_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"title": "t", "url": "u", "content": "Acme launched X"}]
            })))
            .expect(1)
            .mount(&search_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "test-model",
                "choices": [{"message": {"role": "assistant", "content": "# Executive Brief\n## Summary"}}],
                "usage": {"prompt_tokens": 100, "completion_tokens": 20}
            })))
            .expect(4)
            .mount(&generation_server)
            .await;

        let config = config_for(&search_server, &generation_server);
        let overrides = CredentialOverrides {
            search_api_key: Some("tvly-test".into()),
            generation_api_key: Some("gsk-test".into()),
        };

        let result = prepare_meeting(&config, &overrides, acme(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.brief(), "# Executive Brief\n## Summary");
        assert_eq!(result.total_tokens_in, 400);
        assert_eq!(result.total_tokens_out, 80);
        assert_eq!(result.state.search_context(), Some("Acme launched X"));
    }
}
