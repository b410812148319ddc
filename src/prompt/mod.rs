use std::sync::Arc;
use tracing::debug;

use crate::memory::MemoryCache;
use crate::wire::CodeBundle;

pub const PREVIOUS_IMPLEMENTATION_HEADER: &str = "PREVIOUSLY GENERATED IMPLEMENTATION";

pub const MODIFICATION_KEYWORDS: &[&str] = &[
    "add", "change", "modify", "update", "remove", "delete",
    "reset button", "alter", "adjust", "extend", "enhance",
];

/// Decides whether a requirement edits earlier output rather than starting over.
pub trait ModificationClassifier: Send + Sync {
    fn is_modification(&self, requirement: &str) -> bool;
}

/// Case-insensitive substring match against a keyword list. Cheap and
/// knowingly imprecise: "address" contains "add".
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(MODIFICATION_KEYWORDS.iter().copied())
    }
}

impl KeywordClassifier {
    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        Self { keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect() }
    }
}

impl ModificationClassifier for KeywordClassifier {
    fn is_modification(&self, requirement: &str) -> bool {
        let lower = requirement.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

fn output_contract() -> &'static str {
r#"Output format (mandatory):
- Return exactly three fenced code blocks, in this order:
  1. ```html ... ``` with the complete markup (body content, no <style> or <script> tags)
  2. ```css ... ``` with all styles
  3. ```javascript ... ``` with all behavior
- Never leave a block empty. If a section genuinely needs nothing, include a short comment explaining why.
- Do not wrap the blocks in any other fences and do not split a section over several blocks."#
}

/// Builds generation prompts, folding in the latest remembered bundle when a
/// requirement reads like an edit.
pub struct PromptBuilder {
    classifier: Box<dyn ModificationClassifier>,
    memory: Arc<MemoryCache>,
}

impl PromptBuilder {
    pub fn new(classifier: Box<dyn ModificationClassifier>, memory: Arc<MemoryCache>) -> Self {
        Self { classifier, memory }
    }

    pub fn with_keywords(memory: Arc<MemoryCache>) -> Self {
        Self::new(Box::new(KeywordClassifier::default()), memory)
    }

    pub fn memory(&self) -> &Arc<MemoryCache> {
        &self.memory
    }

    pub fn is_modification(&self, requirement: &str) -> bool {
        self.classifier.is_modification(requirement)
    }

    pub fn build(&self, requirement: &str) -> String {
        self.build_with(requirement, requirement)
    }

    /// Classifies `requirement` but asks the model for `body`, which may carry
    /// extra context such as an analysis and plan.
    pub fn build_with(&self, requirement: &str, body: &str) -> String {
        if self.is_modification(requirement) {
            if let Some(previous) = self.memory.latest() {
                debug!("building modification prompt from latest memory entry");
                return modification_prompt(body, &previous);
            }
        }
        fresh_prompt(body)
    }
}

pub fn fresh_prompt(requirement: &str) -> String {
    format!(
"You are an expert front-end developer. Create a complete, working UI from scratch for the following requirement:

{requirement}

Use semantic HTML, modern responsive CSS and plain JavaScript (no frameworks, no external dependencies).

{contract}",
requirement = requirement,
contract = output_contract(),
)
}

pub fn modification_prompt(requirement: &str, previous: &CodeBundle) -> String {
    format!(
"You are an expert front-end developer updating an existing UI.

{header}:

```html
{html}
```

```css
{css}
```

```javascript
{js}
```

Requested change:
{requirement}

Apply the requested change to the implementation above. Return the COMPLETE updated implementation, not a diff:
- Preserve all existing elements, styles and behavior unless the change asks to remove them.
- Keep existing ids and class names stable so current behavior keeps working.

{contract}",
header = PREVIOUS_IMPLEMENTATION_HEADER,
html = previous.markup,
css = previous.style,
js = previous.script,
requirement = requirement,
contract = output_contract(),
)
}

pub fn analysis_prompt(requirement: &str, is_modification: bool) -> String {
    if is_modification {
        format!(
"You are a UI development expert. Carefully analyze the following UI modification requirement:

'{requirement}'

Provide a detailed analysis of what needs to be modified:
1. What existing components need to be changed
2. What new components need to be added
3. What functionality needs to be updated
4. Any potential challenges or conflicts

Return only your analysis, formatted clearly.")
    } else {
        format!(
"You are a UI development expert. Carefully analyze the following UI requirement:

'{requirement}'

Provide a detailed analysis of what this UI requires:
1. Core functionality needed
2. UI components required
3. Potential challenges or ambiguities
4. Any missing information that might be needed

Return only your analysis, formatted clearly.")
    }
}

pub fn plan_prompt(requirement: &str, analysis: &str, is_modification: bool) -> String {
    let (framing, steps) = if is_modification {
        (
            "Create a step-by-step plan to implement the modifications:",
            "1. HTML elements to add or change
2. CSS styles to add or update
3. JavaScript functionality to modify
4. Implementation order that keeps existing behavior working",
        )
    } else {
        (
            "Create a step-by-step plan to implement the UI:",
            "1. HTML structure required
2. CSS styling approach
3. JavaScript functionality needed
4. Implementation order",
        )
    };
    format!(
"Based on this UI requirement: '{requirement}'

And this analysis: '{analysis}'

{framing}
{steps}

Return only the concrete implementation plan, formatted as a clear list.")
}

pub fn codegen_prompt(requirement: &str, analysis: &str, plan: &str) -> String {
    format!(
"Based on this UI requirement: '{requirement}'
Analysis: '{analysis}'
Implementation plan: '{plan}'

Generate the complete UI implementation that follows the plan.
If anything is unclear or not feasible, explain why in code comments.")
}

pub fn feedback_prompt(requirement: &str, analysis: &str) -> String {
    format!(
"The following UI requirement appears to be unclear or not feasible:

'{requirement}'

Based on this analysis: '{analysis}'

Please provide:
1. A clear explanation of what makes this requirement challenging
2. Specific questions that would help clarify the requirement
3. Alternative suggestions that might meet the user's needs

Format this as helpful feedback to the user.")
}

pub fn prd_prompt(requirement: &str) -> String {
    format!(
"You are a skilled product manager. Based on this requirement: '{requirement}',
create a clear, concise, and non-technical Product Requirements Document (PRD).

Structure it as follows:

1. Overview
- Brief description of what needs to be built
- The main goal and purpose

2. Core Features
- List the key features and capabilities needed
- Explain each feature in simple, non-technical terms

3. User Experience
- How users will interact with the feature
- What the user should be able to do

4. Requirements
- List specific requirements and constraints
- Any important behaviors or rules

Keep it concise and avoid any technical implementation details.
Do NOT include sections about success metrics, analytics, or out-of-scope items.
Write in a way that's easy for non-technical stakeholders to understand.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::with_keywords(Arc::new(MemoryCache::new(5)))
    }

    fn previous() -> CodeBundle {
        CodeBundle {
            markup: "<button id=\"go\">Go</button>".into(),
            style: "#go { color: blue; }".into(),
            script: "go.onclick = run;".into(),
        }
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let c = KeywordClassifier::default();
        assert!(c.is_modification("Please ADD a reset button"));
        assert!(c.is_modification("Enhance the header"));
        assert!(!c.is_modification("Build a calculator"));
        assert!(!c.is_modification("asdkj"));
    }

    #[test]
    fn substring_matching_is_knowingly_loose() {
        assert!(KeywordClassifier::default().is_modification("A form for a mailing address"));
    }

    #[test]
    fn non_modification_never_embeds_memory() {
        let b = builder();
        b.memory().remember("Build a calculator", previous());
        for req in ["Build a calculator", "A todo list", "Landing page for a bakery"] {
            let prompt = b.build(req);
            assert!(!prompt.contains(PREVIOUS_IMPLEMENTATION_HEADER), "{req}");
            assert_eq!(prompt, fresh_prompt(req));
        }
    }

    #[test]
    fn modification_without_memory_is_a_fresh_prompt() {
        let b = builder();
        let req = "Add a reset button";
        assert!(b.is_modification(req));
        assert_eq!(b.build(req), fresh_prompt(req));
    }

    #[test]
    fn modification_with_memory_embeds_latest_entry() {
        let b = builder();
        b.memory().remember("older", CodeBundle { markup: "<p>old</p>".into(), ..CodeBundle::default() });
        b.memory().remember("Build a calculator", previous());
        let prompt = b.build("Change the button color to green");
        assert!(prompt.contains(PREVIOUS_IMPLEMENTATION_HEADER));
        assert!(prompt.contains("<button id=\"go\">Go</button>"));
        assert!(prompt.contains("#go { color: blue; }"));
        assert!(prompt.contains("go.onclick = run;"));
        assert!(!prompt.contains("<p>old</p>"));
        assert!(prompt.contains("Change the button color to green"));
    }

    #[test]
    fn build_with_classifies_requirement_not_body() {
        let b = builder();
        b.memory().remember("Build a calculator", previous());
        let body = "Requirement: a weather card\nAnalysis: we should add an icon";
        let prompt = b.build_with("A weather card", body);
        assert_eq!(prompt, fresh_prompt(body));
        let prompt = b.build_with("Update the card colors", body);
        assert!(prompt.contains(PREVIOUS_IMPLEMENTATION_HEADER));
        assert!(prompt.contains("we should add an icon"));
    }

    #[test]
    fn custom_classifier_is_pluggable() {
        struct Never;
        impl ModificationClassifier for Never {
            fn is_modification(&self, _: &str) -> bool {
                false
            }
        }
        let memory = Arc::new(MemoryCache::new(5));
        memory.remember("x", previous());
        let b = PromptBuilder::new(Box::new(Never), memory);
        assert!(!b.build("Add a footer").contains(PREVIOUS_IMPLEMENTATION_HEADER));
    }

    #[test]
    fn every_generation_prompt_demands_three_blocks() {
        for prompt in [fresh_prompt("x"), modification_prompt("x", &previous())] {
            assert!(prompt.contains("```html"));
            assert!(prompt.contains("```css"));
            assert!(prompt.contains("```javascript"));
            assert!(prompt.contains("Never leave a block empty"));
        }
    }

    #[test]
    fn step_prompts_pick_their_variant() {
        assert!(analysis_prompt("x", true).contains("modification requirement"));
        assert!(analysis_prompt("x", false).contains("Core functionality needed"));
        assert!(plan_prompt("x", "a", true).contains("implement the modifications"));
        assert!(plan_prompt("x", "a", false).contains("HTML structure required"));
        let prompt = codegen_prompt("req", "the analysis", "the plan");
        assert!(prompt.contains("the analysis") && prompt.contains("the plan"));
        assert!(feedback_prompt("asdkj", "unclear").contains("Specific questions"));
    }

    #[test]
    fn prd_prompt_has_four_sections() {
        let p = prd_prompt("A habit tracker");
        for section in ["1. Overview", "2. Core Features", "3. User Experience", "4. Requirements"] {
            assert!(p.contains(section), "{section}");
        }
        assert!(p.contains("A habit tracker"));
    }
}
