//! Multiple-choice question generation.
//!
//! Everything here is a pure function of the country list and an explicit
//! random source, so seeded RNGs reproduce a game exactly.

use std::collections::HashSet;
use std::hash::Hash;

use rand::{seq::SliceRandom, Rng};
use tracing::trace;

use crate::{
    country::CountryRecord,
    error::{Result, TriviaError},
};

/// Options shown per question: the answer plus up to three distractors.
pub const MAX_OPTIONS: usize = 4;
const DISTRACTOR_COUNT: usize = MAX_OPTIONS - 1;

/// Build attempts allowed per requested question before generation gives up.
pub const MAX_ATTEMPTS_PER_QUESTION: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Capital,
    Population,
    Region,
    Language,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Capital,
        Category::Population,
        Category::Region,
        Category::Language,
    ];

    /// Whether `country` has the name and the answer field this category
    /// asks about. Hint fields are optional.
    pub fn supports(self, country: &CountryRecord) -> bool {
        country.name().is_some()
            && match self {
                Category::Capital => country.capital().is_some(),
                Category::Population => country.population().is_some(),
                Category::Region => country.region().is_some(),
                Category::Language => !country.languages().is_empty(),
            }
    }

    pub fn option_order(self) -> OptionOrder {
        match self {
            Category::Population => OptionOrder::ByPopulationDistance,
            Category::Capital | Category::Region | Category::Language => OptionOrder::Shuffled,
        }
    }
}

/// How the answer and its distractors are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    /// Uniformly random order.
    Shuffled,
    /// Ascending distance from the asked-about population. Stable, so equal
    /// distances keep the order the options were collected in.
    ByPopulationDistance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub category: Category,
    pub question: String,
    pub correct_answer: String,
    pub options: Vec<String>,
    pub hint: String,
}

impl Question {
    /// Case-insensitive exact match. Whitespace is significant.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.to_lowercase() == self.correct_answer.to_lowercase()
    }
}

/// Builds exactly `count` questions from `countries`.
///
/// Each attempt picks a country and a category at random. Attempts whose
/// country lacks the category's fields are discarded and do not count.
/// Categories no country can support are never drawn. Fails with
/// [`TriviaError::InvalidInput`] on an empty or unusable dataset, or once
/// `count * MAX_ATTEMPTS_PER_QUESTION` attempts have been spent.
pub fn generate_questions<R>(
    countries: &[CountryRecord],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>>
where
    R: Rng + ?Sized,
{
    if countries.is_empty() {
        return Err(TriviaError::invalid_input("country dataset is empty"));
    }

    let categories: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|category| countries.iter().any(|country| category.supports(country)))
        .collect();
    if categories.is_empty() {
        return Err(TriviaError::invalid_input(
            "no country in the dataset has enough data for a question",
        ));
    }

    let pools = OptionPools::new(countries);
    let max_attempts = count.saturating_mul(MAX_ATTEMPTS_PER_QUESTION);
    let mut questions = Vec::with_capacity(count);
    let mut attempts = 0;

    while questions.len() < count {
        if attempts == max_attempts {
            return Err(TriviaError::invalid_input(format!(
                "built only {} of {count} questions after {attempts} attempts",
                questions.len()
            )));
        }
        attempts += 1;

        let country = &countries[rng.gen_range(0..countries.len())];
        let category = categories[rng.gen_range(0..categories.len())];

        match build_question(country, category, countries, &pools, rng) {
            Some(question) => questions.push(question),
            None => trace!(?category, country = ?country.name(), "skipped question attempt"),
        }
    }

    Ok(questions)
}

/// Builds one question of `category` about `country`, or `None` when the
/// country lacks a field the category needs.
pub fn build_question<R>(
    country: &CountryRecord,
    category: Category,
    countries: &[CountryRecord],
    pools: &OptionPools<'_>,
    rng: &mut R,
) -> Option<Question>
where
    R: Rng + ?Sized,
{
    if !category.supports(country) {
        return None;
    }
    let name = country.name()?;
    let region = country.region();
    let capital = country.capital();

    let (question, correct, distractors, hint) = match category {
        Category::Capital => {
            let capital = capital?;
            (
                format!("What is the capital of {name}?"),
                Choice::plain(capital),
                sample_distractors(&pools.capitals, capital, rng),
                region_hint("This", region),
            )
        }
        Category::Population => {
            let population = country.population()?;
            let distractors = nearest_by_population(countries, population, name, DISTRACTOR_COUNT)
                .into_iter()
                .filter_map(|other| {
                    Some(Choice {
                        text: other.name()?.to_string(),
                        distance: other.population()?.abs_diff(population),
                    })
                })
                .collect();
            (
                format!(
                    "Which country has a population closest to {}?",
                    group_thousands(population)
                ),
                Choice::plain(name),
                distractors,
                region_hint("The", region),
            )
        }
        Category::Region => {
            let region = region?;
            (
                format!("In which region is {name} located?"),
                Choice::plain(region),
                sample_distractors(&pools.regions, region, rng),
                capital.map(capital_hint).unwrap_or_default(),
            )
        }
        Category::Language => {
            let languages = country.language_list()?;
            let (verb, noun) = if country.languages().len() > 1 {
                ("are", "languages")
            } else {
                ("is", "language")
            };
            (
                format!("What {verb} the official {noun} of {name}?"),
                Choice::plain(&languages),
                sample_distractors(&pools.language_lists, &languages, rng),
                match (region, capital) {
                    (Some(region), Some(capital)) => format!(
                        "This country is located in {region} and its capital is {capital}."
                    ),
                    (Some(_), None) => region_hint("This", region),
                    (None, Some(capital)) => capital_hint(capital),
                    (None, None) => String::new(),
                },
            )
        }
    };

    let correct_answer = correct.text.clone();
    let options = arrange_options(category.option_order(), correct, distractors, rng);

    Some(Question {
        category,
        question,
        correct_answer,
        options,
        hint,
    })
}

/// Empty when the country has no region on record.
fn region_hint(subject: &str, region: Option<&str>) -> String {
    region
        .map(|region| format!("{subject} country is located in {region}."))
        .unwrap_or_default()
}

fn capital_hint(capital: &str) -> String {
    format!("This country's capital is {capital}.")
}

/// The `k` distinct country names closest in population to `population`,
/// nearest first, skipping `exclude` and countries with no population on
/// record. Ties keep dataset order.
pub fn nearest_by_population<'a>(
    countries: &'a [CountryRecord],
    population: u64,
    exclude: &str,
    k: usize,
) -> Vec<&'a CountryRecord> {
    let mut seen = HashSet::from([exclude]);
    let mut candidates: Vec<&CountryRecord> = countries
        .iter()
        .filter(|country| country.population().is_some())
        .filter(|country| country.name().is_some_and(|name| seen.insert(name)))
        .collect();

    candidates.sort_by_key(|country| {
        country
            .population()
            .map_or(u64::MAX, |other| other.abs_diff(population))
    });
    candidates.truncate(k);
    candidates
}

/// Distinct distractor values drawn from the whole dataset once per game.
#[derive(Debug, Default)]
pub struct OptionPools<'a> {
    capitals: Vec<&'a str>,
    regions: Vec<&'a str>,
    language_lists: Vec<String>,
}

impl<'a> OptionPools<'a> {
    pub fn new(countries: &'a [CountryRecord]) -> Self {
        Self {
            capitals: distinct(countries.iter().filter_map(CountryRecord::capital)),
            regions: distinct(countries.iter().filter_map(CountryRecord::region)),
            language_lists: distinct(countries.iter().filter_map(CountryRecord::language_list)),
        }
    }
}

fn distinct<T>(values: impl Iterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(value.clone())).collect()
}

struct Choice {
    text: String,
    distance: u64,
}

impl Choice {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            distance: 0,
        }
    }
}

fn sample_distractors<R, S>(pool: &[S], correct: &str, rng: &mut R) -> Vec<Choice>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    let candidates: Vec<&str> = pool
        .iter()
        .map(AsRef::as_ref)
        .filter(|candidate| *candidate != correct)
        .collect();

    candidates
        .choose_multiple(rng, DISTRACTOR_COUNT)
        .map(|candidate| Choice::plain(candidate))
        .collect()
}

fn arrange_options<R>(
    order: OptionOrder,
    correct: Choice,
    distractors: Vec<Choice>,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut choices = Vec::with_capacity(distractors.len() + 1);
    choices.push(correct);
    choices.extend(distractors);

    match order {
        OptionOrder::Shuffled => choices.shuffle(rng),
        OptionOrder::ByPopulationDistance => choices.sort_by_key(|choice| choice.distance),
    }

    choices.into_iter().map(|choice| choice.text).collect()
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
