//! Field and cross-field rules applied before anything is persisted.
//!
//! Predicates (`is_*`) are standalone so they can be reused by the CLI
//! loaders. The `validate_*` functions collect every violation of a request
//! into one [`ValidationErrors`] instead of stopping at the first.

use crate::error::ValidationErrors;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const CATALOG_NAME_MAX_LEN: usize = 200;
pub const RECIPE_NAME_MAX_LEN: usize = 200;

/// Upper bound of the smallint-sized columns (`amount`, `cooking_time`).
pub const MAX_SMALL_VALUE: i64 = 32767;

/// Username that would shadow the `/users/me/` route.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("color pattern is valid")
});

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

pub fn is_reserved_username(username: &str) -> bool {
    username.to_lowercase() == RESERVED_USERNAME
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

pub fn is_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Loose shape check: exactly one `@` with something on both sides and a dot
/// in the domain part.
pub fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Returns the first id that appears more than once.
pub fn first_duplicate<T>(items: impl IntoIterator<Item = T>) -> Option<T>
where
    T: Eq + std::hash::Hash + Copy,
{
    let mut seen = HashSet::new();
    items.into_iter().find(|item| !seen.insert(*item))
}

fn check_required(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    match value {
        None => errors.add(field, "This field is required."),
        Some(v) if v.trim().is_empty() => errors.add(field, "This field may not be blank."),
        Some(_) => {}
    }
}

fn check_max_len(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max),
        );
    }
}

fn check_not_blank(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if let Some(v) = value {
        if v.trim().is_empty() {
            errors.add(field, "This field may not be blank.");
        }
    }
}

/// Whether a write creates a record (every field required) or patches one
/// (only submitted fields are checked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignupDraft<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

/// Collects username violations. Both the pattern and the reserved-name
/// rules may fire for the same value.
pub fn check_username(errors: &mut ValidationErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", "This field may not be blank.");
        return;
    }
    check_max_len(errors, "username", username, USERNAME_MAX_LEN);
    if !is_valid_username(username) {
        errors.add(
            "username",
            "Enter a valid username. It may contain only letters, digits and @/./+/-/_ characters.",
        );
    }
    if is_reserved_username(username) {
        errors.add("username", "Choose a different username.");
    }
}

pub fn validate_signup(draft: &SignupDraft<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.email.is_empty() {
        errors.add("email", "This field may not be blank.");
    } else {
        check_max_len(&mut errors, "email", draft.email, EMAIL_MAX_LEN);
        if !is_email(draft.email) {
            errors.add("email", "Enter a valid email address.");
        }
    }

    check_username(&mut errors, draft.username);

    for (field, value) in [
        ("first_name", draft.first_name),
        ("last_name", draft.last_name),
    ] {
        if value.trim().is_empty() {
            errors.add(field, "This field may not be blank.");
        } else {
            check_max_len(&mut errors, field, value, NAME_MAX_LEN);
        }
    }

    if draft.password.is_empty() {
        errors.add("password", "This field may not be blank.");
    }

    errors.into_result()
}

pub fn validate_new_password(
    new_password: &str,
    current_password_matches: bool,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !current_password_matches {
        errors.add("current_password", "Invalid password.");
    }
    if new_password.is_empty() {
        errors.add("new_password", "This field may not be blank.");
    }
    errors.into_result()
}

pub const SELF_FOLLOW_MESSAGE: &str = "You cannot subscribe to yourself.";
pub const DUPLICATE_FOLLOW_MESSAGE: &str = "You are already subscribed to this author.";

/// Self-follow is checked first; the duplicate rule only applies to a
/// distinct author.
pub fn validate_follow(
    follower_id: i32,
    author_id: i32,
    already_following: bool,
) -> Result<(), ValidationErrors> {
    if follower_id == author_id {
        return Err(ValidationErrors::non_field(SELF_FOLLOW_MESSAGE));
    }
    if already_following {
        return Err(ValidationErrors::non_field(DUPLICATE_FOLLOW_MESSAGE));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagDraft<'a> {
    pub name: Option<&'a str>,
    pub color: Option<&'a str>,
    pub slug: Option<&'a str>,
}

pub fn validate_tag(draft: &TagDraft<'_>, mode: WriteMode) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if mode == WriteMode::Create {
        check_required(&mut errors, "name", draft.name);
        check_required(&mut errors, "color", draft.color);
        check_required(&mut errors, "slug", draft.slug);
    } else {
        check_not_blank(&mut errors, "name", draft.name);
        check_not_blank(&mut errors, "color", draft.color);
        check_not_blank(&mut errors, "slug", draft.slug);
    }

    if let Some(name) = draft.name {
        check_max_len(&mut errors, "name", name, CATALOG_NAME_MAX_LEN);
    }
    if let Some(color) = draft.color.filter(|c| !c.trim().is_empty()) {
        if !is_hex_color(color) {
            errors.add("color", "Enter the color in HEX format.");
        }
    }
    if let Some(slug) = draft.slug.filter(|s| !s.trim().is_empty()) {
        check_max_len(&mut errors, "slug", slug, CATALOG_NAME_MAX_LEN);
        if !is_slug(slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }
    }

    errors.into_result()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IngredientDraft<'a> {
    pub name: Option<&'a str>,
    pub measurement_unit: Option<&'a str>,
}

pub fn validate_ingredient(
    draft: &IngredientDraft<'_>,
    mode: WriteMode,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if mode == WriteMode::Create {
        check_required(&mut errors, "name", draft.name);
        check_required(&mut errors, "measurement_unit", draft.measurement_unit);
    } else {
        check_not_blank(&mut errors, "name", draft.name);
        check_not_blank(&mut errors, "measurement_unit", draft.measurement_unit);
    }
    if let Some(name) = draft.name {
        check_max_len(&mut errors, "name", name, CATALOG_NAME_MAX_LEN);
    }
    if let Some(unit) = draft.measurement_unit {
        check_max_len(&mut errors, "measurement_unit", unit, CATALOG_NAME_MAX_LEN);
    }

    errors.into_result()
}

/// One write-form ingredient entry: an ingredient id and how much of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i64,
}

/// The write shape of a recipe, borrowed from the request body.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeDraft<'a> {
    pub name: Option<&'a str>,
    pub image: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cooking_time: Option<i64>,
    pub tags: Option<&'a [i32]>,
    pub ingredients: Option<&'a [IngredientAmount]>,
}

pub fn check_ingredient_entries(errors: &mut ValidationErrors, entries: &[IngredientAmount]) {
    if entries.is_empty() {
        errors.add("ingredients", "Add at least one ingredient.");
        return;
    }
    if first_duplicate(entries.iter().map(|e| e.id)).is_some() {
        errors.add("ingredients", "Ingredients must not repeat.");
    }
    if entries.iter().any(|e| e.amount < 1) {
        errors.add("ingredients", "Ingredient amount must be at least 1.");
    }
    if entries.iter().any(|e| e.amount > MAX_SMALL_VALUE) {
        errors.add(
            "ingredients",
            format!("Ingredient amount must be at most {}.", MAX_SMALL_VALUE),
        );
    }
}

pub fn check_tag_ids(errors: &mut ValidationErrors, tags: &[i32]) {
    if tags.is_empty() {
        errors.add("tags", "Add at least one tag.");
        return;
    }
    if first_duplicate(tags.iter().copied()).is_some() {
        errors.add("tags", "Tags must not repeat.");
    }
}

pub fn check_cooking_time(errors: &mut ValidationErrors, cooking_time: i64) {
    if cooking_time < 1 {
        errors.add("cooking_time", "Cooking time must be at least 1 minute.");
    } else if cooking_time > MAX_SMALL_VALUE {
        errors.add(
            "cooking_time",
            format!("Cooking time must be at most {} minutes.", MAX_SMALL_VALUE),
        );
    }
}

/// Runs every recipe rule and reports all violations together.
pub fn validate_recipe(draft: &RecipeDraft<'_>, mode: WriteMode) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if mode == WriteMode::Create {
        check_required(&mut errors, "name", draft.name);
        check_required(&mut errors, "image", draft.image);
        check_required(&mut errors, "text", draft.text);
        if draft.cooking_time.is_none() {
            errors.add("cooking_time", "This field is required.");
        }
        if draft.tags.is_none() {
            errors.add("tags", "This field is required.");
        }
        if draft.ingredients.is_none() {
            errors.add("ingredients", "This field is required.");
        }
    } else {
        check_not_blank(&mut errors, "name", draft.name);
        check_not_blank(&mut errors, "image", draft.image);
        check_not_blank(&mut errors, "text", draft.text);
    }

    if let Some(name) = draft.name {
        check_max_len(&mut errors, "name", name, RECIPE_NAME_MAX_LEN);
    }
    if let Some(cooking_time) = draft.cooking_time {
        check_cooking_time(&mut errors, cooking_time);
    }
    if let Some(tags) = draft.tags {
        check_tag_ids(&mut errors, tags);
    }
    if let Some(ingredients) = draft.ingredients {
        check_ingredient_entries(&mut errors, ingredients);
    }

    errors.into_result()
}

/// Reports submitted ids that are missing from `existing`, in submission order.
pub fn check_references(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    submitted: impl IntoIterator<Item = i32>,
    existing: &HashSet<i32>,
) {
    for id in submitted {
        if !existing.contains(&id) {
            errors.add(field, format!("{} {} does not exist.", label, id));
        }
    }
}

/// Maps a unique-constraint name from the migration to the field-keyed
/// message the client would have seen from the pre-check.
pub fn unique_violation_message(constraint: &str) -> Option<(&'static str, &'static str)> {
    static MESSAGES: LazyLock<HashMap<&'static str, (&'static str, &'static str)>> =
        LazyLock::new(|| {
            HashMap::from([
                (
                    "unique_author_recipe",
                    ("name", "You already have a recipe with this name."),
                ),
                ("users_email_key", ("email", "A user with that email already exists.")),
                (
                    "users_username_key",
                    ("username", "A user with that username already exists."),
                ),
                ("tags_name_key", ("name", "A tag with this name already exists.")),
                ("tags_color_key", ("color", "A tag with this color already exists.")),
                ("tags_slug_key", ("slug", "A tag with this slug already exists.")),
                (
                    "unique_ingredient",
                    ("name", "This ingredient with this unit already exists."),
                ),
            ])
        });
    MESSAGES.get(constraint).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(pairs: &[(i32, i64)]) -> Vec<IngredientAmount> {
        pairs
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect()
    }

    #[test]
    fn test_reserved_username_is_case_insensitive() {
        assert!(is_reserved_username("me"));
        assert!(is_reserved_username("Me"));
        assert!(is_reserved_username("ME"));
        assert!(!is_reserved_username("meme"));
    }

    #[test]
    fn test_username_pattern() {
        assert!(is_valid_username("chef.bob+1@home-x_y"));
        assert!(is_valid_username("повар"));
        assert!(!is_valid_username("bad name"));
        assert!(!is_valid_username("semi;colon"));
        assert!(!is_valid_username("trailing\n"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_check_username_reports_reserved() {
        let mut errors = ValidationErrors::new();
        check_username(&mut errors, "ME");
        assert_eq!(errors.messages("username"), ["Choose a different username."]);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#E26C2D"));
        assert!(!is_hex_color("E26C2D"));
        assert!(!is_hex_color("#E26C2"));
        assert!(!is_hex_color("#GGGGGG"));
        assert!(!is_hex_color("#fffff"));
    }

    #[test]
    fn test_slug() {
        assert!(is_slug("breakfast"));
        assert!(is_slug("late-night_snack2"));
        assert!(!is_slug("with space"));
        assert!(!is_slug("ужин"));
    }

    #[test]
    fn test_email() {
        assert!(is_email("cook@example.com"));
        assert!(!is_email("cook.example.com"));
        assert!(!is_email("cook@@example.com"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("cook@localhost"));
        assert!(!is_email("co ok@example.com"));
    }

    #[test]
    fn test_signup_collects_all_violations() {
        let draft = SignupDraft {
            email: "nope",
            username: "me",
            first_name: "",
            last_name: "Smith",
            password: "",
        };
        let errors = validate_signup(&draft).unwrap_err();
        assert!(errors.contains("email"));
        assert!(errors.contains("username"));
        assert!(errors.contains("first_name"));
        assert!(errors.contains("password"));
        assert!(!errors.contains("last_name"));
    }

    #[test]
    fn test_signup_ok() {
        let draft = SignupDraft {
            email: "cook@example.com",
            username: "cook",
            first_name: "Julia",
            last_name: "Child",
            password: "s3cret",
        };
        assert!(validate_signup(&draft).is_ok());
    }

    #[test]
    fn test_follow_self_and_duplicate_are_distinct() {
        let self_follow = validate_follow(1, 1, false).unwrap_err();
        let duplicate = validate_follow(1, 2, true).unwrap_err();
        assert_eq!(self_follow.messages("errors"), [SELF_FOLLOW_MESSAGE]);
        assert_eq!(duplicate.messages("errors"), [DUPLICATE_FOLLOW_MESSAGE]);
        assert_ne!(self_follow, duplicate);
        assert!(validate_follow(1, 2, false).is_ok());
    }

    #[test]
    fn test_self_follow_wins_over_duplicate() {
        let errors = validate_follow(3, 3, true).unwrap_err();
        assert_eq!(errors.messages("errors"), [SELF_FOLLOW_MESSAGE]);
    }

    #[test]
    fn test_tag_color_rejected() {
        let draft = TagDraft {
            name: Some("Brunch"),
            color: Some("orange"),
            slug: Some("brunch"),
        };
        let errors = validate_tag(&draft, WriteMode::Create).unwrap_err();
        assert_eq!(errors.messages("color"), ["Enter the color in HEX format."]);
    }

    #[test]
    fn test_tag_update_allows_partial() {
        let draft = TagDraft {
            color: Some("#abc"),
            ..Default::default()
        };
        assert!(validate_tag(&draft, WriteMode::Update).is_ok());
        assert!(validate_tag(&draft, WriteMode::Create).is_err());
    }

    #[test]
    fn test_ingredient_requires_both_fields() {
        let draft = IngredientDraft {
            name: Some("flour"),
            measurement_unit: None,
        };
        let errors = validate_ingredient(&draft, WriteMode::Create).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["measurement_unit"]);
    }

    #[test]
    fn test_recipe_reports_everything_at_once() {
        let ingredients = amounts(&[(1, 0), (1, 5)]);
        let tags: Vec<i32> = vec![];
        let draft = RecipeDraft {
            name: Some("Pancakes"),
            image: Some("data:image/png;base64,AAAA"),
            text: Some("Mix and fry."),
            cooking_time: Some(0),
            tags: Some(&tags),
            ingredients: Some(&ingredients),
        };
        let errors = validate_recipe(&draft, WriteMode::Create).unwrap_err();
        assert_eq!(
            errors.messages("ingredients"),
            [
                "Ingredients must not repeat.",
                "Ingredient amount must be at least 1."
            ]
        );
        assert_eq!(errors.messages("tags"), ["Add at least one tag."]);
        assert_eq!(
            errors.messages("cooking_time"),
            ["Cooking time must be at least 1 minute."]
        );
    }

    #[test]
    fn test_recipe_empty_ingredients() {
        let ingredients: Vec<IngredientAmount> = vec![];
        let tags = vec![1, 2];
        let draft = RecipeDraft {
            name: Some("Tea"),
            image: Some("img"),
            text: Some("Boil water."),
            cooking_time: Some(3),
            tags: Some(&tags),
            ingredients: Some(&ingredients),
        };
        let errors = validate_recipe(&draft, WriteMode::Create).unwrap_err();
        assert_eq!(errors.messages("ingredients"), ["Add at least one ingredient."]);
    }

    #[test]
    fn test_recipe_duplicate_tags() {
        let ingredients = amounts(&[(1, 1)]);
        let tags = vec![2, 2];
        let draft = RecipeDraft {
            name: Some("Tea"),
            image: Some("img"),
            text: Some("Boil water."),
            cooking_time: Some(3),
            tags: Some(&tags),
            ingredients: Some(&ingredients),
        };
        let errors = validate_recipe(&draft, WriteMode::Create).unwrap_err();
        assert_eq!(errors.messages("tags"), ["Tags must not repeat."]);
    }

    #[test]
    fn test_recipe_create_requires_fields() {
        let errors = validate_recipe(&RecipeDraft::default(), WriteMode::Create).unwrap_err();
        for field in ["name", "image", "text", "cooking_time", "tags", "ingredients"] {
            assert_eq!(errors.messages(field), ["This field is required."], "{}", field);
        }
    }

    #[test]
    fn test_recipe_update_checks_only_submitted() {
        let draft = RecipeDraft {
            cooking_time: Some(15),
            ..Default::default()
        };
        assert!(validate_recipe(&draft, WriteMode::Update).is_ok());

        let tags: Vec<i32> = vec![];
        let draft = RecipeDraft {
            tags: Some(&tags),
            ..Default::default()
        };
        let errors = validate_recipe(&draft, WriteMode::Update).unwrap_err();
        assert_eq!(errors.messages("tags"), ["Add at least one tag."]);
    }

    #[test]
    fn test_amount_upper_bound() {
        let mut errors = ValidationErrors::new();
        check_ingredient_entries(&mut errors, &amounts(&[(1, MAX_SMALL_VALUE + 1)]));
        assert_eq!(errors.messages("ingredients").len(), 1);
    }

    #[test]
    fn test_check_references_lists_missing_ids() {
        let existing: HashSet<i32> = [1, 2].into_iter().collect();
        let mut errors = ValidationErrors::new();
        check_references(&mut errors, "tags", "Tag", [1, 7, 2, 9], &existing);
        assert_eq!(
            errors.messages("tags"),
            ["Tag 7 does not exist.", "Tag 9 does not exist."]
        );
    }

    #[test]
    fn test_unique_violation_lookup() {
        assert_eq!(
            unique_violation_message("unique_author_recipe").map(|(f, _)| f),
            Some("name")
        );
        assert!(unique_violation_message("whatever").is_none());
    }
}
