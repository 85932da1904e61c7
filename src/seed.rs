// src/seed.rs

use crate::{
    models::subject::NewSubject,
    store::{DataStore, StoreError},
};

fn demo_subjects() -> Vec<NewSubject> {
    vec![
        NewSubject {
            name: "Arithmetic".to_string(),
            slug: "adding-small-numbers".to_string(),
            title: "Adding small numbers".to_string(),
            question: "What is 2 + 3?".to_string(),
            data: "Count two apples, then three more.".to_string(),
            correct_answer: "5".to_string(),
            help_text: "<p>Start at 2 and count up three times: 3, 4, 5.</p>".to_string(),
            video_search: "adding numbers for beginners".to_string(),
        },
        NewSubject {
            name: "Biology".to_string(),
            slug: "photosynthesis".to_string(),
            title: "How plants make food".to_string(),
            question: "What process do plants use to turn sunlight into energy?".to_string(),
            data: "Leaves contain chlorophyll, which absorbs light.".to_string(),
            correct_answer: "photosynthesis".to_string(),
            help_text: "<p>The word starts with <b>photo</b>, meaning light.</p>".to_string(),
            video_search: "photosynthesis explained".to_string(),
        },
        NewSubject {
            name: "Geography".to_string(),
            slug: "capital-of-france".to_string(),
            title: "European capitals".to_string(),
            question: "What is the capital of France?".to_string(),
            data: "The city lies on the Seine.".to_string(),
            correct_answer: "paris".to_string(),
            help_text: "<p>It is home to the Eiffel Tower.</p>".to_string(),
            video_search: "capital of france".to_string(),
        },
    ]
}

/// Inserts the demo catalogue when no subjects exist yet.
/// Returns the number of subjects created.
pub async fn seed_demo_subjects(store: &dyn DataStore) -> Result<usize, StoreError> {
    if !store.list_subjects().await?.is_empty() {
        return Ok(0);
    }

    let mut created = 0;
    for subject in demo_subjects() {
        tracing::info!("Seeding subject: {}", subject.slug);
        store.create_subject(subject).await?;
        created += 1;
    }
    Ok(created)
}
