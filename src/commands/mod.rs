mod config_cmd;
mod meal;
mod progress;
mod summary;
mod template;
mod workout;

pub use config_cmd::ConfigCommand;
pub use meal::MealCommand;
pub use progress::ProgressCommand;
pub use summary::SummaryCommand;
pub use template::TemplateCommand;
pub use workout::WorkoutCommand;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::ValueEnum;
use fittrack_core::{FormError, FormSession, ItemField, LineItem, Metric};
use std::io::{self, Write};
use uuid::Uuid;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}

pub fn parse_id(s: &str, what: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|_| format!("Invalid {} ID: {}", what, s))
}

/// Parse a point in time given on the command line, in local time.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM`, or a bare date (taken as local noon).
pub fn parse_when(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = match NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        Ok(naive) => naive,
        Err(_) => parse_date(s)
            .map(|d| d.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)))
            .map_err(|_| {
                format!(
                    "Invalid time '{}'. Use YYYY-MM-DD, 'YYYY-MM-DD HH:MM' or RFC 3339.",
                    s
                )
            })?,
    };

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", s))
}

/// Shorten `s` to `width` characters for table output.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

/// Ask a yes/no question on stdin; anything but "y" is no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// One row entered on the command line, before it is applied to a form.
#[derive(Debug, Clone, PartialEq)]
pub struct RowInput {
    pub name: String,
    pub values: Vec<(Metric, String)>,
}

/// `NAME:SETSxREPS[@WEIGHT]`, e.g. `Bench Press:3x10@135`
pub fn parse_exercise(s: &str) -> Result<RowInput, String> {
    let invalid = || format!("Invalid exercise '{}'. Use NAME:SETSxREPS[@WEIGHT].", s);

    let (name, rest) = s.rsplit_once(':').ok_or_else(invalid)?;
    let (volume, weight) = match rest.split_once('@') {
        Some((volume, weight)) => (volume, Some(weight)),
        None => (rest, None),
    };
    let (sets, reps) = volume
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;

    let mut values = vec![
        (Metric::Sets, sets.to_string()),
        (Metric::Reps, reps.to_string()),
    ];
    if let Some(weight) = weight {
        values.push((Metric::Weight, weight.to_string()));
    }

    Ok(RowInput {
        name: name.trim().to_string(),
        values,
    })
}

/// `NAME:CALORIES[:PROTEIN:CARBS:FAT]`, e.g. `Greek yogurt:120:15:7:0`
pub fn parse_food_item(s: &str) -> Result<RowInput, String> {
    let mut parts = s.split(':');
    let name = parts.next().unwrap_or_default().trim().to_string();
    let numbers: Vec<&str> = parts.collect();

    if name.is_empty() || numbers.is_empty() || numbers.len() > Metric::NUTRITION.len() {
        return Err(format!(
            "Invalid food item '{}'. Use NAME:CALORIES[:PROTEIN:CARBS:FAT].",
            s
        ));
    }

    Ok(RowInput {
        name,
        values: Metric::NUTRITION
            .iter()
            .zip(numbers)
            .map(|(metric, value)| (*metric, value.to_string()))
            .collect(),
    })
}

/// `NAME[:SETS]`; sets default to 3
pub fn parse_template_exercise(s: &str) -> Result<RowInput, String> {
    let (name, sets) = match s.rsplit_once(':') {
        Some((name, sets)) => (name, sets),
        None => (s, "3"),
    };
    if name.trim().is_empty() {
        return Err(format!("Invalid exercise '{}'. Use NAME[:SETS].", s));
    }

    Ok(RowInput {
        name: name.trim().to_string(),
        values: vec![(Metric::Sets, sets.to_string())],
    })
}

/// Enter rows into a form. The first row takes over a lone blank row.
pub fn fill_session<T: LineItem>(
    session: &mut FormSession<T>,
    rows: &[RowInput],
) -> Result<(), FormError> {
    for row in rows {
        let lone_blank = match session.items() {
            [only] if only.item.name().trim().is_empty() => Some(only.key),
            _ => None,
        };
        let key = match lone_blank {
            Some(key) => key,
            None => session.add_item(),
        };
        session.update_item(key, ItemField::Name, &row.name)?;
        for (metric, value) in &row.values {
            session.update_item(key, ItemField::Metric(*metric), value)?;
        }
    }
    Ok(())
}

/// Remove every row whose name matches, ignoring case.
pub fn remove_rows_named<T: LineItem>(
    session: &mut FormSession<T>,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let keys: Vec<_> = session
        .items()
        .iter()
        .filter(|k| k.item.name().eq_ignore_ascii_case(name.trim()))
        .map(|k| k.key)
        .collect();

    if keys.is_empty() {
        return Err(format!("No {} named '{}'", T::KIND, name).into());
    }
    for key in keys {
        session.remove_item(key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fittrack_core::{Exercise, FoodItem, TemplateExercise};

    #[test]
    fn test_parse_exercise() {
        let row = parse_exercise("Bench Press:3x10@135").unwrap();
        assert_eq!(row.name, "Bench Press");
        assert_eq!(
            row.values,
            vec![
                (Metric::Sets, "3".to_string()),
                (Metric::Reps, "10".to_string()),
                (Metric::Weight, "135".to_string()),
            ]
        );

        let row = parse_exercise("Pull-ups:3X8").unwrap();
        assert_eq!(row.values.len(), 2);

        assert!(parse_exercise("Squats").is_err());
        assert!(parse_exercise("Squats:4").is_err());
    }

    #[test]
    fn test_parse_food_item() {
        let row = parse_food_item("Greek yogurt:120:15:7:0").unwrap();
        assert_eq!(row.name, "Greek yogurt");
        assert_eq!(row.values.len(), 4);
        assert_eq!(row.values[1], (Metric::Protein, "15".to_string()));

        let row = parse_food_item("Black coffee:5").unwrap();
        assert_eq!(row.values, vec![(Metric::Calories, "5".to_string())]);

        assert!(parse_food_item("Apple").is_err());
        assert!(parse_food_item(":90").is_err());
        assert!(parse_food_item("Apple:1:2:3:4:5").is_err());
    }

    #[test]
    fn test_parse_template_exercise() {
        assert_eq!(
            parse_template_exercise("Deadlift:5").unwrap().values,
            vec![(Metric::Sets, "5".to_string())]
        );
        assert_eq!(
            parse_template_exercise("Lunges").unwrap().values,
            vec![(Metric::Sets, "3".to_string())]
        );
        assert!(parse_template_exercise(":4").is_err());
    }

    #[test]
    fn test_fill_session_uses_initial_blank_row() {
        let mut session: FormSession<FoodItem> = FormSession::new();
        let rows = vec![
            parse_food_item("Banana:105:1:27:0").unwrap(),
            parse_food_item("Honey:40:0:10:0").unwrap(),
        ];

        fill_session(&mut session, &rows).unwrap();

        assert_eq!(session.len(), 2);
        assert_eq!(session.items()[0].item.name, "Banana");
        assert_eq!(session.totals().sum(Metric::Calories), 145.0);
    }

    #[test]
    fn test_fill_session_clamps_bad_numbers() {
        let mut session: FormSession<Exercise> = FormSession::new();
        fill_session(&mut session, &[parse_exercise("Squats:fourx8").unwrap()]).unwrap();

        assert_eq!(session.items()[0].item.sets, 0);
        assert_eq!(session.items()[0].item.reps, 8);
    }

    #[test]
    fn test_remove_rows_named() {
        let mut session: FormSession<TemplateExercise> = FormSession::new();
        fill_session(
            &mut session,
            &[
                parse_template_exercise("Squats:4").unwrap(),
                parse_template_exercise("Lunges:3").unwrap(),
            ],
        )
        .unwrap();

        remove_rows_named(&mut session, "squats").unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.items()[0].item.name, "Lunges");

        assert!(remove_rows_named(&mut session, "Bench").is_err());

        remove_rows_named(&mut session, "Lunges").unwrap();
        assert_eq!(session.len(), 1);
        assert!(session.items()[0].item.name.is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Leg Day", 30), "Leg Day");
        assert_eq!(truncate("Crème brûlée with berries", 10), "Crème b...");
    }

    #[test]
    fn test_parse_when() {
        let utc = parse_when("2025-05-03T12:45:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2025-05-03T12:45:00+00:00");

        let local = parse_when("2025-05-03").unwrap();
        assert_eq!(
            local.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2025, 5, 3).unwrap()
        );

        assert!(parse_when("tomorrow").is_err());
    }
}
