use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use ui_agent::agent::{Orchestrator, Pipeline};
use ui_agent::errors::Disposition;
use ui_agent::log::{RunArtifacts, Stage};
use ui_agent::memory::{key_for, MemoryCache};
use ui_agent::prompt::PREVIOUS_IMPLEMENTATION_HEADER;
use ui_agent::provider::{Completion, DynCompletion};
use ui_agent::session::Session;
use ui_agent::wire::{GenerateResponse, MARKUP_FILE, SCRIPT_FILE, STYLE_FILE};
use ui_agent::ServiceError;

/// Stands in for the remote model: answers each prompt with the next reply.
struct FakeModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Completion for FakeModel {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| ServiceError::TimedOut { attempts: 30 })
    }
}

const CALCULATOR: &str = r#"Sure! Here is the calculator.

```html
<div class="calculator">
  <input id="display" readonly>
  <div class="keys"><button data-key="1">1</button><button data-key="+">+</button></div>
</div>
```

```css
.calculator { display: grid; gap: 8px; }
```

```javascript
document.querySelectorAll('[data-key]').forEach(b => b.addEventListener('click', press));
```
"#;

#[tokio::test]
async fn calculator_end_to_end() {
    let model = FakeModel::new(&[
        "A calculator needs a display and a keypad.",
        "1. Markup for display and keys\n2. Grid styling\n3. Click handlers",
        CALCULATOR,
    ]);
    let memory = Arc::new(MemoryCache::new(5));
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::clone(&memory));

    let result = agent.run("Build a calculator", Pipeline::Full).await.unwrap();

    assert!(result.analysis.as_deref().unwrap().contains("display and a keypad"));
    assert!(result.plan.as_deref().unwrap().contains("Grid styling"));
    assert!(result.code.markup.contains("class=\"calculator\""));
    assert_eq!(result.code.style, ".calculator { display: grid; gap: 8px; }");
    assert!(result.code.script.contains("addEventListener"));
    assert!(result.feedback.is_none());
    assert!(memory.contains(&key_for("Build a calculator")));

    let response = GenerateResponse::from(result);
    assert!(!response.files[MARKUP_FILE].is_empty());
    assert!(!response.files[STYLE_FILE].is_empty());
    assert!(!response.files[SCRIPT_FILE].is_empty());
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["feedback"].is_null());
}

#[tokio::test]
async fn nonsense_requirement_gets_feedback() {
    let model = FakeModel::new(&[
        "The requirement 'asdkj' does not describe any interface.",
        "No plan can be made without more detail.",
        "I'm sorry, I can't build anything from that.",
        "Could you describe what the page should show and who will use it?",
    ]);
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::new(MemoryCache::new(5)));

    let result = agent.run("asdkj", Pipeline::Full).await.unwrap();

    assert_eq!(result.code.markup, "");
    assert_eq!(result.code.style, "");
    assert_eq!(result.code.script, "");
    let feedback = result.feedback.as_deref().unwrap();
    assert!(!feedback.is_empty());
    assert_eq!(model.prompts.lock().len(), 4);
}

#[tokio::test]
async fn follow_up_edits_the_previous_result() {
    let model = FakeModel::new(&[
        "analysis",
        "plan",
        CALCULATOR,
        "modification analysis",
        "modification plan",
        "```html\n<div class=\"calculator\"><button id=\"reset\">C</button></div>\n```",
    ]);
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::new(MemoryCache::new(5)));

    agent.run("Build a calculator", Pipeline::Full).await.unwrap();
    let edited = agent.run("Add a reset button", Pipeline::Full).await.unwrap();

    let prompts = model.prompts.lock();
    assert!(prompts[3].contains("modification requirement"));
    assert!(prompts[4].contains("implement the modifications"));
    assert!(prompts[5].contains("PREVIOUSLY GENERATED IMPLEMENTATION"));
    assert!(prompts[5].contains(".calculator { display: grid; gap: 8px; }"));
    assert!(edited.code.markup.contains("reset"));
}

#[tokio::test]
async fn backend_failure_maps_to_service_unavailable() {
    let model = FakeModel::new(&["analysis only"]);
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::new(MemoryCache::new(5)));

    let err = agent.run("Build a calculator", Pipeline::Full).await.unwrap_err();
    assert_eq!(err.disposition(), Disposition::ServiceUnavailable);
}

#[tokio::test]
async fn transcripts_land_in_the_run_directory() {
    let root = tempfile::tempdir().unwrap();
    let artifacts = Arc::new(RunArtifacts::new(root.path(), uuid::Uuid::new_v4()));
    let model = FakeModel::new(&[CALCULATOR]);
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::new(MemoryCache::new(5)))
        .with_transcripts(artifacts.clone());

    agent.run("Build a calculator", Pipeline::Direct).await.unwrap();

    assert!(artifacts.path_for(Stage::Generate).exists());
    assert!(!artifacts.path_for(Stage::Analysis).exists());
}

#[tokio::test]
async fn chat_session_carries_memory_between_turns() {
    let model = FakeModel::new(&[
        CALCULATOR,
        "```html\n<div class=\"calculator\"><button id=\"reset\">C</button></div>\n```",
    ]);
    let completion: DynCompletion = model.clone();
    let agent = Orchestrator::new(completion, Arc::new(MemoryCache::new(5)));
    let input = std::io::Cursor::new("Build a calculator\nAdd a reset button\n:quit\n");

    let summary = Session::new(&agent, Pipeline::Direct).run(input, |_| Ok(())).await.unwrap();

    assert_eq!(summary.turns, 2);
    let prompts = model.prompts.lock();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains(PREVIOUS_IMPLEMENTATION_HEADER));
    assert!(prompts[1].contains(PREVIOUS_IMPLEMENTATION_HEADER));
    assert!(prompts[1].contains(".calculator { display: grid; gap: 8px; }"));
}
