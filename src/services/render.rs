//! Turns the view state into what the user sees. Everything here is a pure
//! function of [`ViewState`]; the terminal and HTTP surfaces only pick an
//! output format.

use serde::Serialize;

use super::state::ViewState;
use crate::models::SupplySnapshot;

pub const PAGE_TITLE: &str = "Althea L1 Info";
pub const CARD_TITLE: &str = "Gravity Supply Info";
pub const LOADING_TEXT: &str = "Loading...";
pub const UNIT: &str = "ALTHEA";

/// Base units per displayed "M": 10^18 base units per token, 10^6 tokens.
const DISPLAY_SCALE: f64 = 1e24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Card(Card),
}

/// `1e26` -> `"100.00M ALTHEA"`. A NaN amount renders as `"NaNM ALTHEA"`.
pub fn format_amount(amount: f64) -> String {
    format!("{}M {}", to_fixed_2(amount / DISPLAY_SCALE), UNIT)
}

/// Two-decimal fixed notation with ECMAScript `Number.prototype.toFixed`
/// semantics: exact ties round away from zero, `-0` has no sign, non-finite
/// values are spelled `NaN`/`Infinity`, and magnitudes of 1e21 and up fall
/// back to exponent notation.
fn to_fixed_2(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if x < 0.0 { "-" } else { "" };
    let x = x.abs();
    if x >= 1e21 {
        return format!("{}{}", sign, format!("{:e}", x).replace('e', "e+"));
    }

    // Every finite f64 has a terminating decimal expansion of at most 1074
    // fractional digits, so this is the exact value.
    let exact = format!("{:.1100}", x);
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac.as_bytes();
    let digit = |i: usize| frac.get(i).map_or(0, |d| u128::from(d - b'0'));

    let mut hundredths = int_part.parse::<u128>().unwrap_or(0) * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        hundredths += 1;
    }

    format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
}

fn card_lines(s: &SupplySnapshot) -> Vec<String> {
    // total_liquid_balances is reported but not shown
    [
        ("Total Supply", s.total_supply),
        ("Community Pool", s.community_pool),
        ("Liquid (Not Vesting)", s.total_liquid_supply),
        ("Liquid (Not Vesting) and staked", s.total_nonvesting_staked),
        ("Unclaimed staking rewards", s.total_unclaimed_rewards),
        ("Unvested", s.total_vesting),
        ("Unvested Staked", s.total_vesting_staked),
        ("Vested", s.total_vested),
    ]
    .iter()
    .map(|(label, amount)| format!("{}: {}", label, format_amount(*amount)))
    .collect()
}

pub fn screen(view: &ViewState) -> Screen {
    match view {
        ViewState::Loading => Screen::Loading,
        ViewState::Loaded { snapshot, .. } => Screen::Card(Card {
            title: CARD_TITLE,
            lines: card_lines(snapshot),
        }),
    }
}

impl Screen {
    pub fn is_loading(&self) -> bool {
        matches!(self, Screen::Loading)
    }

    pub fn to_text(&self) -> String {
        match self {
            Screen::Loading => LOADING_TEXT.to_string(),
            Screen::Card(card) => {
                let mut out = String::from(card.title);
                out.push('\n');
                for line in &card.lines {
                    out.push_str(line);
                    out.push('\n');
                }
                out
            }
        }
    }

    /// Standalone page that re-requests itself every poll period.
    pub fn to_html(&self, refresh_secs: u64) -> String {
        let body = match self {
            Screen::Loading => format!(r#"<div class="spinner">{}</div>"#, LOADING_TEXT),
            Screen::Card(card) => {
                let lines: String = card.lines.iter()
                    .map(|l| format!(r#"<div style="font-size: 15px">{}</div>"#, l))
                    .collect();
                format!(
                    r#"<div class="card" style="border-radius: 8px; padding: 25px"><h1>{}</h1>{}</div>"#,
                    card.title, lines
                )
            }
        };

        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><meta http-equiv=\"refresh\" content=\"{}\"><title>{}</title></head><body><div class=\"App-header\" style=\"display: flex; flex-wrap: wrap\">{}</div></body></html>\n",
            refresh_secs, PAGE_TITLE, body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::supply::coerce_amount;
    use crate::models::FetchOutcome;
    use serde_json::{json, Value};

    fn full_payload() -> Value {
        json!({
            "community_pool": 2.5e24,
            "total_supply": 1e26,
            "total_liquid_supply": 5e25,
            "total_liquid_balances": 4e25,
            "total_unclaimed_rewards": 1e21,
            "total_nonvesting_staked": 3e25,
            "total_vesting": 4e25,
            "total_vesting_staked": 1e25,
            "total_vested": 1.2e25,
        })
    }

    fn view_from(value: Value) -> ViewState {
        ViewState::after(FetchOutcome::from_value(value)).unwrap()
    }

    #[test]
    fn initial_state_shows_loading() {
        let screen = screen(&ViewState::default());
        assert!(screen.is_loading());
        assert_eq!(screen.to_text(), "Loading...");
    }

    #[test]
    fn total_supply_line_is_in_millions() {
        let Screen::Card(card) = screen(&view_from(full_payload())) else {
            panic!("expected a card");
        };
        assert_eq!(card.title, "Gravity Supply Info");
        assert_eq!(card.lines[0], "Total Supply: 100.00M ALTHEA");
    }

    #[test]
    fn card_has_eight_lines_in_display_order() {
        let Screen::Card(card) = screen(&view_from(full_payload())) else {
            panic!("expected a card");
        };
        assert_eq!(
            card.lines,
            vec![
                "Total Supply: 100.00M ALTHEA",
                "Community Pool: 2.50M ALTHEA",
                "Liquid (Not Vesting): 50.00M ALTHEA",
                "Liquid (Not Vesting) and staked: 30.00M ALTHEA",
                "Unclaimed staking rewards: 0.00M ALTHEA",
                "Unvested: 40.00M ALTHEA",
                "Unvested Staked: 10.00M ALTHEA",
                "Vested: 12.00M ALTHEA",
            ]
        );
    }

    #[test]
    fn string_payload_keeps_loading_indicator() {
        assert!(screen(&view_from(json!("error"))).is_loading());
    }

    #[test]
    fn missing_field_renders_nan() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("total_vested");

        let Screen::Card(card) = screen(&view_from(payload)) else {
            panic!("expected a card");
        };
        assert_eq!(card.lines[7], "Vested: NaNM ALTHEA");
        assert!(card.lines[7].contains("NaNM ALTHEA"));
    }

    #[test]
    fn decimal_strings_render_like_numbers() {
        let view = view_from(json!({ "total_supply": "100000000000000000000000000" }));
        let Screen::Card(card) = screen(&view) else {
            panic!("expected a card");
        };
        assert_eq!(card.lines[0], "Total Supply: 100.00M ALTHEA");
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        let tie = coerce_amount(&json!("125000000000000000000000"));
        assert_eq!(format_amount(tie), "0.13M ALTHEA");
        assert_eq!(format_amount(-tie), "-0.13M ALTHEA");

        assert_eq!(to_fixed_2(0.125), "0.13");
        assert_eq!(to_fixed_2(2.5), "2.50");
        // below the tie once written out exactly
        assert_eq!(to_fixed_2(1.005), "1.00");
        assert_eq!(to_fixed_2(2.675), "2.67");
    }

    #[test]
    fn non_finite_and_signed_zero_follow_to_fixed() {
        assert_eq!(format_amount(coerce_amount(&json!("Infinity"))), "InfinityM ALTHEA");
        assert_eq!(format_amount(coerce_amount(&json!("-Infinity"))), "-InfinityM ALTHEA");
        assert_eq!(format_amount(coerce_amount(&json!("-0"))), "0.00M ALTHEA");
        assert_eq!(format_amount(-1e21), "-0.00M ALTHEA");
        assert_eq!(format_amount(f64::NAN), "NaNM ALTHEA");
    }

    #[test]
    fn huge_values_use_exponent_notation() {
        assert_eq!(to_fixed_2(1e21), "1e+21");
        assert_eq!(to_fixed_2(-1.5e21), "-1.5e+21");
        assert_eq!(to_fixed_2(123456.789), "123456.79");
    }

    #[test]
    fn html_carries_page_title_and_lines() {
        let html = screen(&view_from(full_payload())).to_html(5);
        assert!(html.contains("<title>Althea L1 Info</title>"));
        assert!(html.contains("<h1>Gravity Supply Info</h1>"));
        assert!(html.contains("Vested: 12.00M ALTHEA"));
        assert!(html.contains(r#"content="5""#));
    }
}
