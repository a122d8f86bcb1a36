//! Plain-text rendering of analysis results.
//!
//! Formatting never changes a number; values are only rounded for display.

use crate::application::analysis::calendar::WeekSummary;
use crate::application::analysis::conditional::TransitionStat;
use crate::application::analysis::range_blocks::RangeBlockSummary;
use crate::application::analysis::report::{AnalysisReport, IndexBaseReport, RangeBlockReport};
use crate::domain::patterns::outcome::ConditionalOutcomeStat;
use crate::domain::patterns::range_block::DateStreak;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 80;
const DATE_FMT: &str = "%d/%m/%Y";
const LONG_DATE_FMT: &str = "%A, %d/%m/%Y";

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

fn opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v))
}

fn opt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}

fn heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{}", title)?;
    writeln!(out, "{}", rule('-'))
}

// Writing into a String never fails
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

/// Renders the full pattern report in its fixed section order
pub fn format_analysis(report: &AnalysisReport) -> String {
    render(|out| {
        write_overview(out, report)?;
        write_day_of_week(out, report)?;
        write_outcomes(out, "Weekly Streak Patterns", "week", &report.weekly_streak_outcomes)?;
        write_outcomes(out, "Daily Streak Patterns", "day", &report.daily_streak_outcomes)?;
        write_monthly(out, report)?;
        write_volatility(out, report)?;
        write_price_levels(out, report)?;
        write_range_blocks(out, &report.range_blocks)?;
        write_weekly(out, &report.weekly)
    })
}

fn write_overview(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    let o = &report.overview;
    let d = &o.distribution;

    writeln!(out, "{}", rule('='))?;
    writeln!(
        out,
        "📊 Analysis Results ({} - {} | {} Trading Days)",
        o.first_date.format(DATE_FMT),
        o.last_date.format(DATE_FMT),
        d.trading_days
    )?;
    writeln!(out, "{}", rule('='))?;

    writeln!(out, "Overall Distribution:")?;
    writeln!(out, "  Positive Days: {:.2}% ({} days)", d.positive_pct, d.positive_days)?;
    writeln!(out, "  Negative Days: {:.2}% ({} days)", d.negative_pct, d.negative_days)?;
    writeln!(out, "  Neutral Days:  {:.2}% ({} days)", d.neutral_pct, d.neutral_days)?;

    writeln!(out, "\nAverage Changes:")?;
    writeln!(out, "  Average Positive Change: {}", opt_pct(o.avg_positive_change))?;
    writeln!(out, "  Average Negative Change: {}", opt_pct(o.avg_negative_change))?;

    writeln!(out, "\nLongest Overall Streak:")?;
    match &o.longest_streak {
        Some(s) => writeln!(
            out,
            "  {} days ({}) from {} to {}",
            s.length,
            s.kind,
            s.start_date.format(LONG_DATE_FMT),
            s.end_date.format(LONG_DATE_FMT)
        )?,
        None => writeln!(out, "  none")?,
    }

    writeln!(out, "\nPrice Extremes:")?;
    if let Some(high) = &o.highest_high {
        writeln!(out, "  Highest High: {:.2} on {}", high.value, high.date.format(DATE_FMT))?;
    }
    if let Some(low) = &o.lowest_low {
        writeln!(out, "  Lowest Low:   {:.2} on {}", low.value, low.date.format(DATE_FMT))?;
    }
    writeln!(out, "  Average Daily Range: {}", opt_num(o.avg_daily_range))?;

    let w = &o.weekly;
    writeln!(out, "\nWeekly Patterns:")?;
    writeln!(out, "  Average Weekly Range: {}", opt_num(w.avg_weekly_range))?;
    writeln!(out, "  Strong Positive Weeks: {}", w.strong_positive_weeks)?;
    writeln!(out, "  Weak Positive Weeks:   {}", w.weak_positive_weeks)?;
    writeln!(out, "  Strong Negative Weeks: {}", w.strong_negative_weeks)?;
    writeln!(out, "  Weak Negative Weeks:   {}", w.weak_negative_weeks)?;
    writeln!(out, "  Consecutive Positive Weeks: {}", w.consecutive_positive_weeks)?;
    writeln!(out, "  Consecutive Negative Weeks: {}", w.consecutive_negative_weeks)
}

fn write_day_of_week(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    heading(out, "Day of Week Patterns")?;
    writeln!(
        out,
        "{:<10} | {:>7} | {:>7} | {:>7} | {:>6} | {:>6} | {:>8} | {:>8} | {:>5}",
        "Day", "Mean", "Median", "StdDev", "Pos%", "Neg%", "AvgGain", "AvgLoss", "Days"
    )?;
    for day in &report.day_of_week.day_stats {
        let s = &day.stats;
        writeln!(
            out,
            "{:<10} | {:>7} | {:>7} | {:>7} | {:>6.2} | {:>6.2} | {:>8.2} | {:>8.2} | {:>5}",
            day.weekday,
            opt_num(s.mean),
            opt_num(day.median),
            opt_num(day.std_dev),
            s.positive_pct,
            s.negative_pct,
            s.avg_gain,
            s.avg_loss,
            s.count
        )?;
    }

    let transitions = &report.day_of_week.transitions;
    if transitions.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nDay Transitions:")?;
    let describe = |stat: &Option<TransitionStat>| match stat {
        Some(t) => format!(
            "{:.2}% positive next, avg {:.2}% ({} cases)",
            t.prob_positive, t.avg_change, t.count
        ),
        None => "no cases".to_string(),
    };
    for t in transitions {
        writeln!(out, "  {} → {}:", t.from, t.to)?;
        writeln!(out, "    after positive: {}", describe(&t.after_positive))?;
        writeln!(out, "    after negative: {}", describe(&t.after_negative))?;
    }
    Ok(())
}

fn write_outcomes(
    out: &mut String,
    title: &str,
    unit: &str,
    stats: &[ConditionalOutcomeStat],
) -> fmt::Result {
    heading(out, title)?;
    if stats.is_empty() {
        writeln!(out, "  Not enough data")?;
        return Ok(());
    }
    for s in stats {
        writeln!(
            out,
            "  After {} {} {}{}: next {} positive {:.2}%, negative {:.2}%, avg change {:.2}% ({} cases)",
            s.length,
            s.kind,
            unit,
            if s.length == 1 { "" } else { "s" },
            unit,
            s.prob_next_positive,
            s.prob_next_negative,
            s.avg_next_change,
            s.count
        )?;
    }
    Ok(())
}

fn write_monthly(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    heading(out, "Monthly Patterns")?;
    for m in &report.monthly.daily {
        writeln!(
            out,
            "  {:<9}: mean {} median {} | {:.2}% up {:.2}% down | {} days",
            m.name,
            opt_pct(m.stats.mean),
            opt_pct(m.median),
            m.stats.positive_pct,
            m.stats.negative_pct,
            m.stats.count
        )?;
    }

    if report.monthly.performance.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nMonthly Performance:")?;
    for p in &report.monthly.performance {
        writeln!(
            out,
            "  {:<9}: avg return {:.2}% | {:.2}% positive, {:.2}% negative | {} months",
            p.name, p.avg_monthly_return, p.positive_months_pct, p.negative_months_pct, p.count
        )?;
    }
    Ok(())
}

fn write_volatility(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    heading(out, "Volatility Patterns")?;
    let v = &report.volatility;
    let Some(c) = &v.clustering else {
        writeln!(out, "  No high-volatility days")?;
        return Ok(());
    };
    writeln!(out, "  Volatility threshold: {:.2}%", c.threshold)?;
    writeln!(
        out,
        "  High volatility followed by high volatility: {:.2}%",
        c.prob_high_vol_after_high_vol
    )?;
    writeln!(
        out,
        "  High volatility days: {} ({} consecutive)",
        c.high_vol_days_count, c.consecutive_high_vol_count
    )?;
    if let Some(a) = &v.after_high_volatility {
        writeln!(out, "  After high volatility:")?;
        writeln!(
            out,
            "    Positive: {:.2}% (avg {:.2}%)",
            a.prob_positive, a.avg_positive_change
        )?;
        writeln!(
            out,
            "    Negative: {:.2}% (avg {:.2}%)",
            a.prob_negative, a.avg_negative_change
        )?;
    }
    Ok(())
}

fn write_price_levels(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    heading(out, "Price Level Patterns")?;
    if report.price_levels.is_empty() {
        writeln!(out, "  No price data")?;
        return Ok(());
    }
    for level in &report.price_levels {
        writeln!(
            out,
            "  {:<10} ({:.2} - {:.2}): mean {} | {:.2}% up {:.2}% down | {} days",
            level.level,
            level.lower,
            level.upper,
            opt_pct(level.mean_change),
            level.positive_pct,
            level.negative_pct,
            level.count
        )?;
    }
    Ok(())
}

fn format_streaks(streaks: &[DateStreak]) -> String {
    if streaks.is_empty() {
        return "-".to_string();
    }
    streaks
        .iter()
        .map(|s| format!("{}d {}..{}", s.length, s.start_date.format(DATE_FMT), s.end_date.format(DATE_FMT)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_range_blocks(out: &mut String, blocks: &[RangeBlockSummary]) -> fmt::Result {
    heading(out, "Range Blocks")?;
    writeln!(
        out,
        "{:>8} | {:>9} | {:>5} | {:>5} | Streaks",
        "Block", "Avg", "Count", "Weeks"
    )?;
    for b in blocks {
        writeln!(
            out,
            "{:>7.2}% | {:>8.2}% | {:>5} | {:>5} | {}",
            b.block,
            b.avg_change,
            b.count,
            b.weeks.len(),
            format_streaks(&b.streaks)
        )?;
    }
    Ok(())
}

fn write_weekly(out: &mut String, weeks: &[WeekSummary]) -> fmt::Result {
    heading(out, "Weekly Breakdown")?;
    for w in weeks {
        writeln!(
            out,
            "\nWeek {} ({} - {}) | {} days | net {:.2}%",
            w.week,
            w.start_date.format(DATE_FMT),
            w.end_date.format(DATE_FMT),
            w.trading_days,
            w.net_change
        )?;
        writeln!(
            out,
            "  {} up / {} down / {} flat | avg gain {:.2}% | avg loss {:.2}%",
            w.stats.positive_count, w.stats.negative_count, w.neutral_days, w.stats.avg_gain, w.stats.avg_loss
        )?;
        if let (Some(best), Some(worst)) = (&w.best_day, &w.worst_day) {
            writeln!(
                out,
                "  Best: {} ({:.2}%) | Worst: {} ({:.2}%)",
                best.date.format(LONG_DATE_FMT),
                best.value,
                worst.date.format(LONG_DATE_FMT),
                worst.value
            )?;
        }
        if let (Some(high), Some(low)) = (&w.highest_high, &w.lowest_low) {
            writeln!(
                out,
                "  High: {:.2} on {} | Low: {:.2} on {}",
                high.value,
                high.date.format(DATE_FMT),
                low.value,
                low.date.format(DATE_FMT)
            )?;
        }
        if let Some(v) = &w.most_volatile {
            writeln!(
                out,
                "  Most volatile: {} ({:.2}%, range {})",
                v.date.format(LONG_DATE_FMT),
                v.change_pct,
                opt_num(v.range)
            )?;
        }
        if let Some(s) = &w.longest_streak {
            writeln!(
                out,
                "  Streak: {} {} days ({} - {})",
                s.length,
                s.kind,
                s.start_date.format(DATE_FMT),
                s.end_date.format(DATE_FMT)
            )?;
        }
        for day in &w.days {
            writeln!(
                out,
                "    {:<22} {:>8} | range {:>8} ({})",
                day.date.format(LONG_DATE_FMT).to_string(),
                opt_pct(day.change_pct),
                opt_num(day.range),
                opt_pct(day.range_pct)
            )?;
        }
    }
    Ok(())
}

/// Renders the stand-alone range-block view
pub fn format_range_blocks(report: &RangeBlockReport) -> String {
    render(|out| {
        writeln!(
            out,
            "📈 Range blocks of {:.2}% ({} - {})",
            report.block_width,
            report.first_date.format(DATE_FMT),
            report.last_date.format(DATE_FMT)
        )?;
        write_range_blocks(out, &report.blocks)
    })
}

/// Renders the index-base comparison as a table
pub fn format_index_base(report: &IndexBaseReport) -> String {
    render(|out| write_index_base(out, report))
}

fn write_index_base(out: &mut String, report: &IndexBaseReport) -> fmt::Result {
    writeln!(
        out,
        "{:<10} | {:>12} | {:>12} | {:>12} | {:>12} | {:>9} | {:>9} | {:>9} | {:>12} | {:>9}",
        "Date", "Primary Open", "Open", "Low", "High", "SinceLow%", "SinceHi%", "AltOpen%", "Price", "Price%"
    )?;
    writeln!(out, "{}", rule('-'))?;
    for r in &report.rows {
        writeln!(
            out,
            "{:<10} | {:>12} | {:>12} | {:>12} | {:>12} | {:>9} | {:>9} | {:>9} | {:>12} | {:>9}",
            r.date.format(DATE_FMT).to_string(),
            opt_num(r.primary_open),
            opt_num(r.open),
            opt_num(r.low),
            opt_num(r.high),
            opt_num(r.since_low),
            opt_num(r.since_high),
            opt_num(r.alt_open),
            opt_num(r.price),
            opt_num(r.price_vs_open)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analysis::engine::PatternEngine;
    use crate::domain::market::daily_record::DailyRecord;
    use chrono::NaiveDate;

    fn sample_report() -> AnalysisReport {
        let records: Vec<DailyRecord> = [(6, 1.0), (7, 1.0), (8, -1.0), (9, 0.5), (10, -2.0)]
            .into_iter()
            .map(|(d, c)| {
                DailyRecord::new(NaiveDate::from_ymd_opt(2025, 1, d).unwrap(), Some(c))
                    .with_prices(100.0 + d as f64, 101.0 + d as f64, 99.0 + d as f64)
            })
            .collect();
        PatternEngine::default().analyze_records(records).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let text = format_analysis(&sample_report());
        let sections = [
            "Analysis Results",
            "Day of Week Patterns",
            "Weekly Streak Patterns",
            "Daily Streak Patterns",
            "Monthly Patterns",
            "Volatility Patterns",
            "Price Level Patterns",
            "Range Blocks",
            "Weekly Breakdown",
        ];
        let positions: Vec<usize> = sections.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_overview_numbers() {
        let text = format_analysis(&sample_report());
        assert!(text.contains("Positive Days: 60.00% (3 days)"));
        assert!(text.contains("2 days (positive) from Monday, 06/01/2025 to Tuesday, 07/01/2025"));
        assert!(text.contains("After 2 positive days: next day positive 0.00%"));
    }

    #[test]
    fn test_missing_average_renders_na() {
        let records = vec![DailyRecord::new(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(), Some(1.0))];
        let report = PatternEngine::default().analyze_records(records).unwrap();
        assert!(format_analysis(&report).contains("Average Negative Change: N/A"));
    }

    #[test]
    fn test_index_base_without_rows_keeps_header() {
        let text = format_index_base(&IndexBaseReport { rows: Vec::new() });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date"));
        assert_eq!(lines[1], rule('-'));
    }
}
