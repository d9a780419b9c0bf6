use crate::models::AnimalType;

/// A single label returned by the external label-detection service.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub confidence: f64,
}

impl Label {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into().to_lowercase(),
            confidence,
        }
    }
}

/// Outcome of mapping detected labels to an animal category.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub animal: AnimalType,
    pub confidence: f64,
    pub breed: Option<String>,
    pub all_labels: Vec<String>,
}

/// Minimum label confidence for a category match; anything below maps to
/// `Other`.
pub const MATCH_CONFIDENCE_FLOOR: f64 = 0.5;

/// Minimum confidence for the classifier result to auto-fill the animal
/// type during pet creation.
pub const AUTO_FILL_CONFIDENCE: f64 = 0.7;

const KEYWORD_TABLE: &[(AnimalType, &[&str])] = &[
    (
        AnimalType::Dog,
        &["dog", "canine", "puppy", "hound", "retriever", "bulldog", "terrier", "shepherd"],
    ),
    (
        AnimalType::Cat,
        &["cat", "feline", "kitten", "kitty", "persian", "siamese", "tabby"],
    ),
    (
        AnimalType::Bird,
        &["bird", "avian", "parrot", "canary", "cockatoo", "parakeet", "finch", "pigeon"],
    ),
    (AnimalType::Rabbit, &["rabbit", "bunny", "hare", "cottontail"]),
    (AnimalType::Hamster, &["hamster", "gerbil", "guinea pig"]),
    (AnimalType::Fish, &["fish", "goldfish", "tropical fish", "aquarium"]),
    (
        AnimalType::Reptile,
        &["reptile", "lizard", "snake", "turtle", "gecko", "iguana", "chameleon"],
    ),
];

const BREED_TABLE: &[(AnimalType, &[&str])] = &[
    (
        AnimalType::Dog,
        &[
            "golden retriever",
            "labrador",
            "bulldog",
            "german shepherd",
            "poodle",
            "beagle",
            "rottweiler",
            "yorkshire terrier",
            "boxer",
            "husky",
            "chihuahua",
        ],
    ),
    (
        AnimalType::Cat,
        &[
            "persian",
            "siamese",
            "maine coon",
            "british shorthair",
            "ragdoll",
            "bengal",
            "abyssinian",
            "russian blue",
            "scottish fold",
        ],
    ),
    (
        AnimalType::Bird,
        &["parrot", "canary", "cockatoo", "parakeet", "finch", "budgie", "macaw"],
    ),
];

/// Map detected labels to an animal category by keyword containment.
///
/// Selects the category whose matching label carries the highest
/// confidence; returns `Other` (no breed) when nothing clears the 0.5
/// floor.
pub fn classify(labels: &[Label]) -> Classification {
    let all_labels: Vec<String> = labels.iter().map(|l| l.text.clone()).collect();

    let mut best: Option<(AnimalType, f64)> = None;

    for (animal, keywords) in KEYWORD_TABLE {
        for label in labels {
            for keyword in *keywords {
                if label.text.contains(keyword) {
                    match best {
                        Some((_, confidence)) if confidence >= label.confidence => {}
                        _ => best = Some((*animal, label.confidence)),
                    }
                }
            }
        }
    }

    match best {
        Some((animal, confidence)) if confidence > MATCH_CONFIDENCE_FLOOR => Classification {
            animal,
            confidence,
            breed: extract_breed(labels, animal),
            all_labels,
        },
        _ => Classification {
            animal: AnimalType::Other,
            confidence: best.map_or(0.0, |(_, c)| c),
            breed: None,
            all_labels,
        },
    }
}

/// Pick a breed name out of the labels for the detected category, if any
/// of the known breed keywords appears.
pub fn extract_breed(labels: &[Label], animal: AnimalType) -> Option<String> {
    let breeds = BREED_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == animal)
        .map(|(_, breeds)| *breeds)?;

    for label in labels {
        for breed in breeds {
            if label.text.contains(breed) {
                return Some((*breed).to_string());
            }
        }
    }

    None
}
