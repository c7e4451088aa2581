use chrono::{Datelike, Duration, NaiveDate};

/// Start of the week containing `date`, Sunday-based.
pub fn week_floor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn day_of_week(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

pub fn format_amount(amount: f32) -> String {
    format!("${amount:.2}")
}

pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_floor_goes_back_to_sunday() {
        // 2024-03-05 is a Tuesday; the Sunday before is 2024-03-03.
        assert_eq!(week_floor(date(2024, 3, 5)), date(2024, 3, 3));
        assert_eq!(week_floor(date(2024, 3, 3)), date(2024, 3, 3));
    }

    #[test]
    fn day_of_week_is_sunday_based() {
        assert_eq!(day_of_week(date(2024, 3, 3)), 0);
        assert_eq!(day_of_week(date(2024, 3, 9)), 6);
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("coffee SHOP downtown"), "Coffee Shop Downtown");
        assert_eq!(title_case(""), "");
    }
}
