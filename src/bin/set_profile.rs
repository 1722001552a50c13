//! Utility to set profile biometrics from the command line
//!
//! Usage: set_profile [--age N] [--weight-kg X | --weight-lb X]
//!                    [--height-cm X | --height-ft X --height-in X]
//!                    [--gender male|female|other] [--activity LEVEL]
//!                    [--goal lose|maintain|gain] [--adopt]

use clap::Parser;

use cico::db;
use cico::models::UserProfile;
use cico::nutrition::{format_breakdown, ActivityLevel, Gender, GoalType};
use cico::tools::profile::{calculate_calories, get_profile, update_profile, ProfileInput};

#[derive(Debug, Parser)]
#[command(
    name = "set_profile",
    about = "Set CICO profile biometrics",
    long_about = "Update the stored profile from metric or imperial measurements and optionally adopt the recommended calorie goal"
)]
struct Args {
    /// Age in years
    #[arg(long)]
    age: Option<u32>,

    /// Body weight in kilograms
    #[arg(long, conflicts_with = "weight_lb")]
    weight_kg: Option<f64>,

    /// Body weight in pounds
    #[arg(long)]
    weight_lb: Option<f64>,

    /// Height in centimeters
    #[arg(long, conflicts_with_all = ["height_ft", "height_in"])]
    height_cm: Option<f64>,

    /// Height, feet part
    #[arg(long)]
    height_ft: Option<f64>,

    /// Height, inches part
    #[arg(long)]
    height_in: Option<f64>,

    /// male, female, or other
    #[arg(long, value_parser = parse_enum::<Gender>)]
    gender: Option<Gender>,

    /// sedentary, lightly_active, moderately_active, very_active, extra_active
    #[arg(long, value_parser = parse_enum::<ActivityLevel>)]
    activity: Option<ActivityLevel>,

    /// lose, maintain, or gain
    #[arg(long, value_parser = parse_enum::<GoalType>)]
    goal: Option<GoalType>,

    /// Save the recommended calorie target and macro split as goals
    #[arg(long)]
    adopt: bool,
}

fn parse_enum<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr<Err = cico::nutrition::NutritionError>,
{
    value.parse().map_err(|e: cico::nutrition::NutritionError| e.to_string())
}

impl Args {
    fn to_input(&self) -> ProfileInput {
        ProfileInput {
            age: self.age,
            weight_kg: self.weight_kg,
            weight_lb: self.weight_lb,
            height_cm: self.height_cm,
            height_ft: self.height_ft,
            height_in: self.height_in,
            gender: self.gender,
            activity_level: self.activity,
            goal_type: self.goal,
            ..Default::default()
        }
    }
}

fn print_profile(profile: &UserProfile) {
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    println!("Profile:");
    println!("  Age: {}", show(profile.age.map(|a| a.to_string())));
    println!("  Weight: {} kg", show(profile.weight_kg.map(|w| w.to_string())));
    println!("  Height: {} cm", show(profile.height_cm.map(|h| h.to_string())));
    println!("  Gender: {}", show(profile.gender.map(|g| g.as_str().to_string())));
    println!("  Activity: {}", profile.activity_level.as_str());
    println!("  Goal: {}", profile.goal_type.as_str());
    println!("  Daily calorie goal: {}", profile.daily_calorie_goal);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let input = args.to_input();

    let db_path = db::database_path();
    println!("Database path: {}", db_path.display());
    let database = db::open(&db_path)?;

    if !input.to_update()?.is_empty() {
        update_profile(&database, &input)?;
    }

    if args.adopt {
        let calculated = calculate_calories(&database, &ProfileInput::default(), true)?;
        if !calculated.missing.is_empty() {
            println!("Cannot adopt a goal; missing: {}", calculated.missing.join(", "));
        }
    }

    let response = get_profile(&database)?;
    print_profile(&response.profile);

    match &response.recommendation {
        Some(result) => {
            println!();
            println!("{}", format_breakdown(result));
        }
        None => println!("\nSet age, weight, height, and gender to get a recommendation."),
    }

    Ok(())
}
