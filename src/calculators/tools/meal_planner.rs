use crate::core::{Calculator, Card, Env, Table};
use crate::domain::model::Form;
use crate::utils::error::{CalcError, Result};
use crate::utils::format::{format_max, plural};
use async_trait::async_trait;
use serde::Serialize;

pub const CHILD_FACTOR: f64 = 0.6;

pub fn style_multiplier(style: &str) -> f64 {
    match style.trim().to_ascii_lowercase().as_str() {
        "light" => 0.85,
        "hearty" => 1.2,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Course {
    Protein,
    Grains,
    Vegetables,
    Salad,
    Dessert,
    Drinks,
}

impl Course {
    pub const ALL: [Course; 6] = [
        Course::Protein,
        Course::Grains,
        Course::Vegetables,
        Course::Salad,
        Course::Dessert,
        Course::Drinks,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protein" => Some(Self::Protein),
            "grains" => Some(Self::Grains),
            "vegetables" => Some(Self::Vegetables),
            "salad" => Some(Self::Salad),
            "dessert" => Some(Self::Dessert),
            "drinks" => Some(Self::Drinks),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Protein => "Main protein",
            Self::Grains => "Starch / grains",
            Self::Vegetables => "Cooked vegetables",
            Self::Salad => "Salad",
            Self::Dessert => "Dessert servings",
            Self::Drinks => "Drinks",
        }
    }

    /// Ounces cooked for protein and grains, cups for vegetables and salad,
    /// pieces for dessert, fluid ounces for drinks.
    pub fn portion_per_adult(self) -> f64 {
        match self {
            Self::Protein => 6.0,
            Self::Grains => 4.5,
            Self::Vegetables => 1.25,
            Self::Salad => 1.5,
            Self::Dessert => 1.0,
            Self::Drinks => 16.0,
        }
    }

    /// (shopping amount, serving hint)
    pub fn describe(self, units: f64, servings: f64) -> (String, String) {
        let servings = servings.ceil();
        match self {
            Self::Protein => {
                let pounds = units / 16.0;
                (
                    format!("{:.1} lb cooked ({:.2} kg)", pounds, pounds * 0.453_592_37),
                    format!("Plan for about {} plated portions at 6 oz cooked each.", servings),
                )
            }
            Self::Grains => (
                format!("{:.1} cups cooked sides (~{:.1} lb)", units / 5.0, units / 16.0),
                format!("Enough for roughly {} people at a generous scoop.", servings),
            ),
            Self::Vegetables => (
                format!("{:.1} cups cooked veggies (~{:.1} lb fresh)", units, units * 0.24),
                format!("Consider prepping {} ramekins or side portions.", servings),
            ),
            Self::Salad => (
                format!("{:.1} cups of greens", units),
                format!(
                    "≈{} large serving bowls or {} bags of salad mix.",
                    (units / 10.0).ceil(),
                    (units / 5.0).ceil()
                ),
            ),
            Self::Dessert => (
                format!("{} individual desserts", units.ceil()),
                format!("That's about {} dozen pieces for trays or platters.", (units / 12.0).ceil()),
            ),
            Self::Drinks => (
                format!("{:.1} gallons ({:.1} L) of beverages", units / 128.0, units * 0.029_573_5),
                format!(
                    "Covers roughly {} 12-oz pours (water, punch, or soft drinks).",
                    (units / 12.0).ceil()
                ),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub child_equivalent: f64,
    pub style_multiplier: f64,
    pub leftover_multiplier: f64,
    pub servings: f64,
    pub courses: Vec<(Course, f64)>,
}

pub fn plan(adults: f64, children: f64, style: f64, leftovers_percent: f64, courses: &[Course]) -> Result<MealPlan> {
    let adults = if adults.is_finite() { adults.max(0.0) } else { 0.0 };
    let children = if children.is_finite() { children.max(0.0) } else { 0.0 };
    if adults <= 0.0 && children <= 0.0 {
        return Err(CalcError::invalid("Add at least one adult or child to calculate portions."));
    }
    if courses.is_empty() {
        return Err(CalcError::invalid("Select at least one course to include in the plan."));
    }
    let child_equivalent = children * CHILD_FACTOR;
    let leftover_multiplier = 1.0 + leftovers_percent.max(0.0) / 100.0;
    let servings = (adults + child_equivalent) * style * leftover_multiplier;
    Ok(MealPlan {
        child_equivalent,
        style_multiplier: style,
        leftover_multiplier,
        servings,
        courses: courses
            .iter()
            .map(|c| (*c, servings * c.portion_per_adult()))
            .collect(),
    })
}

/// Comma separated course ids; absent means every course. Unknown ids are skipped.
pub fn parse_courses(form: &Form) -> Vec<Course> {
    match form.raw("courses") {
        None => Course::ALL.to_vec(),
        Some(list) => list.split(',').filter_map(Course::parse).collect(),
    }
}

pub struct MealPlanner;

#[async_trait]
impl Calculator for MealPlanner {
    fn key(&self) -> &'static str {
        "meal-planner"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let adults = form.value_or("adults", 0.0);
        let children = form.value_or("kids", 0.0);
        let style = form.text_or("style", "standard");
        let courses = parse_courses(form);
        let meal = plan(
            adults,
            children,
            style_multiplier(style),
            form.value_or("leftovers", 0.0).max(0.0),
            &courses,
        )?;

        let mut table = Table::new(&["Course", "Shopping amount", "Serving guide"]);
        for (course, units) in &meal.courses {
            let (primary, secondary) = course.describe(*units, meal.servings);
            table.push(&[course.label().to_string(), primary, secondary]);
        }
        let labels: Vec<&str> = courses.iter().map(|c| c.label()).collect();

        Card::new("Portion overview")
            .headline(format!(
                "Plan for {} adult-equivalent servings across {} course{}.",
                meal.servings.ceil(),
                courses.len(),
                plural(courses.len() as i64)
            ))
            .stat("Adults", format_max(adults.max(0.0), 1))
            .stat(
                "Children",
                format!("{} (≈{} adult servings)", format_max(children.max(0.0), 1), format_max(meal.child_equivalent, 1)),
            )
            .stat("Meal style multiplier", format!("{:.2} ({})", meal.style_multiplier, style))
            .stat("Leftover buffer", format!("{}%", format_max(meal.leftover_multiplier * 100.0 - 100.0, 1)))
            .stat("Total adult-equivalent servings", format_max(meal.servings, 1))
            .stat("Courses included", labels.join(", "))
            .table(table)
            .note("Adjust the leftover buffer down for plated meals or up for buffet-style service. For specialty diets, create a second run with only the dishes that apply.")
            .data(&meal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servings() {
        let meal = plan(10.0, 5.0, style_multiplier("hearty"), 10.0, &[Course::Protein]).unwrap();
        assert!((meal.servings - 13.0 * 1.2 * 1.1).abs() < 1e-9);
        let (primary, _) = Course::Protein.describe(meal.courses[0].1, meal.servings);
        assert_eq!(primary, "6.4 lb cooked (2.92 kg)");
    }

    #[test]
    fn test_requires_people_and_courses() {
        assert!(plan(0.0, 0.0, 1.0, 0.0, &Course::ALL).is_err());
        assert!(plan(4.0, 0.0, 1.0, 0.0, &[]).is_err());
    }

    #[test]
    fn test_course_list() {
        let form = Form::new().with("courses", "salad, drinks,caviar");
        assert_eq!(parse_courses(&form), vec![Course::Salad, Course::Drinks]);
        assert_eq!(parse_courses(&Form::new()).len(), 6);
    }
}
