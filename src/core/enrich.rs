use std::sync::Arc;

use crate::models::MatchedTeacherView;
use crate::services::{ChatPrompt, DescriptionGenerator, EnrichmentError};

/// How many views at the head of the ranking get a generated description
pub const DEFAULT_MAX_ENRICHED: usize = 5;

/// Description used when generation fails and the teacher has no bio
pub const DEFAULT_FALLBACK_DESCRIPTION: &str = "Experienced educator ready to help you learn.";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates engaging teacher profiles.";

/// Attaches generated descriptions to the best-ranked views
///
/// Each view in the prefix is enriched by its own task. A failed call only
/// affects that view, which falls back to the teacher's bio or a fixed text.
/// Calls are made once; there is no retry.
#[derive(Clone)]
pub struct Enricher {
    generator: Arc<dyn DescriptionGenerator>,
    max_enriched: usize,
    fallback: String,
}

impl Enricher {
    pub fn new(generator: Arc<dyn DescriptionGenerator>, max_enriched: usize, fallback: String) -> Self {
        Self {
            generator,
            max_enriched,
            fallback,
        }
    }

    pub fn with_defaults(generator: Arc<dyn DescriptionGenerator>) -> Self {
        Self::new(generator, DEFAULT_MAX_ENRICHED, DEFAULT_FALLBACK_DESCRIPTION.to_string())
    }

    /// Enrich the first `max_enriched` views, leaving the rest untouched
    ///
    /// Waits for every call to settle. Output order equals input order.
    pub async fn enrich(&self, mut views: Vec<MatchedTeacherView>, query: &str) -> Vec<MatchedTeacherView> {
        let cap = self.max_enriched.min(views.len());
        let rest = views.split_off(cap);

        let handles: Vec<_> = views
            .into_iter()
            .map(|view| {
                let generator = Arc::clone(&self.generator);
                let prompt = build_prompt(&view, query);

                let handle = tokio::spawn(async move { generator.generate(&prompt).await });
                (view, handle)
            })
            .collect();

        let mut enriched = Vec::with_capacity(cap + rest.len());

        for (mut view, handle) in handles {
            let outcome = handle
                .await
                .unwrap_or_else(|e| Err(EnrichmentError::TaskFailed(e.to_string())));

            let description = match outcome {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Description generation failed for teacher {}: {}", view.teacher.id, e);
                    self.fallback_for(&view)
                }
            };

            view.ai_description = Some(description);
            enriched.push(view);
        }

        enriched.extend(rest);
        enriched
    }

    fn fallback_for(&self, view: &MatchedTeacherView) -> String {
        view.teacher
            .non_blank_bio()
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Build the generation prompt for one view
pub fn build_prompt(view: &MatchedTeacherView, query: &str) -> ChatPrompt {
    let teacher = &view.teacher;

    let name = view
        .profile
        .as_ref()
        .map(|p| p.full_name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or("Experienced teacher");

    let expertise = if teacher.expertise_areas.is_empty() {
        "Various areas".to_string()
    } else {
        teacher.expertise_areas.join(", ")
    };

    let user = format!(
        "Generate a brief, engaging 2-sentence description for a teacher with these details:\n\
         Name: {}\n\
         Occupation: {}\n\
         Experience: {} years\n\
         Skill: {} ({})\n\
         Expertise: {}\n\n\
         Make it professional and highlight why they're a great match for learning {}.",
        name,
        teacher.occupation,
        teacher.years_of_experience,
        view.skill_name,
        view.proficiency_level.as_str(),
        expertise,
        query
    );

    ChatPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
