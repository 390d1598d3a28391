//! Human-readable assessment report built from a validated submission.

use std::fmt::Write as _;

use assessment_core::QuestionBank;
use assessment_core::model::{AnswerMap, AnswerOption, PhaseId, QuestionId, SectionId};
use assessment_core::scoring::{
    PerformanceBand, ProficiencyTier, QuestionOutcome, ScoreCard, Tally, compute_scores,
    review_answers,
};
use assessment_core::time::{elapsed_since, format_elapsed};
use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Submission dates are shown in Asia/Bangkok local time (UTC+7, no DST).
const REPORT_OFFSET_SECS: i32 = 7 * 3600;
const EXCERPT_CHARS: usize = 80;

//
// ─── REPORT ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLine {
    pub id: SectionId,
    pub name: String,
    pub tally: Tally,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseLine {
    pub id: PhaseId,
    pub name: String,
    pub tally: Tally,
    pub sections: Vec<SectionLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLine {
    pub id: QuestionId,
    pub excerpt: String,
    pub selected: Option<AnswerOption>,
    pub correct: AnswerOption,
    pub outcome: QuestionOutcome,
}

impl ReviewLine {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.outcome == QuestionOutcome::Correct
    }

    #[must_use]
    pub fn selected_label(&self) -> String {
        self.selected
            .map_or_else(|| "None".to_string(), |option| option.to_string())
    }
}

/// Everything the outbound report shows, derived from the shared scoring code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentReport {
    title: String,
    subtitle: Option<String>,
    scores: ScoreCard,
    phases: Vec<PhaseLine>,
    review: Vec<ReviewLine>,
    time_spent: String,
    submitted_at: DateTime<FixedOffset>,
}

impl AssessmentReport {
    #[must_use]
    pub fn build(
        bank: &QuestionBank,
        answers: &AnswerMap,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let scores = compute_scores(bank, answers);

        let phases = bank
            .phases()
            .iter()
            .map(|phase| PhaseLine {
                id: phase.id(),
                name: phase.name().to_string(),
                tally: scores.phase(phase.id()).unwrap_or_default(),
                sections: bank
                    .sections_in_phase(phase)
                    .map(|section| SectionLine {
                        id: section.id().clone(),
                        name: section.name().to_string(),
                        tally: scores.section(section.id()).unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        let review = review_answers(bank, answers)
            .into_iter()
            .map(|entry| ReviewLine {
                id: entry.id,
                excerpt: bank
                    .question(entry.id)
                    .map(|question| excerpt(question.text()))
                    .unwrap_or_default(),
                selected: entry.selected,
                correct: entry.correct,
                outcome: entry.outcome,
            })
            .collect();

        Self {
            title: bank.title().to_string(),
            subtitle: bank.subtitle().map(str::to_string),
            scores,
            phases,
            review,
            time_spent: format_elapsed(elapsed_since(Some(started_at), submitted_at)),
            submitted_at: submitted_at.with_timezone(&report_offset()),
        }
    }

    #[must_use]
    pub fn scores(&self) -> &ScoreCard {
        &self.scores
    }

    #[must_use]
    pub fn phases(&self) -> &[PhaseLine] {
        &self.phases
    }

    #[must_use]
    pub fn review(&self) -> &[ReviewLine] {
        &self.review
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.scores.percentage()
    }

    #[must_use]
    pub fn tier(&self) -> ProficiencyTier {
        self.scores.tier()
    }

    /// Elapsed time between start and submission as `m:ss`.
    #[must_use]
    pub fn time_spent(&self) -> &str {
        &self.time_spent
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<FixedOffset> {
        self.submitted_at
    }

    /// e.g. `November 15, 2023 at 05:13:20 AM`
    #[must_use]
    pub fn submitted_display(&self) -> String {
        self.submitted_at
            .format("%B %-d, %Y at %I:%M:%S %p")
            .to_string()
    }

    #[must_use]
    pub fn subject(&self) -> String {
        let tier = self.tier();
        format!(
            "Assessment Results: {}% ({} - {})",
            self.percentage(),
            tier.level(),
            tier.title()
        )
    }

    //
    // ─── RENDERING ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn render_html(&self) -> String {
        let percent = self.percentage();
        let tier = self.tier();
        let score_color = band_color(self.scores.band());
        let mut html = String::new();

        let _ = write!(
            html,
            "<div style=\"max-width:640px;margin:0 auto;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#0f0f1a;color:#e2e8f0;padding:32px 24px;border-radius:12px;\">\
             <h1 style=\"text-align:center;color:#f59e0b;margin-bottom:4px;\">{} Results</h1>",
            escape_html(&self.title)
        );
        if let Some(subtitle) = &self.subtitle {
            let _ = write!(
                html,
                "<p style=\"text-align:center;color:#94a3b8;margin-top:0;\">{}</p>",
                escape_html(subtitle)
            );
        }

        let _ = write!(
            html,
            "<div style=\"text-align:center;margin:24px 0;\">\
             <div style=\"display:inline-block;padding:16px 32px;background:#1a1a2e;border-radius:12px;border:2px solid {score_color};\">\
             <div style=\"font-size:48px;font-weight:bold;color:{score_color};\">{percent}%</div>\
             <div style=\"color:#94a3b8;font-size:14px;\">{} / {} correct</div>\
             </div></div>",
            self.scores.total_correct(),
            self.scores.total_questions()
        );

        let _ = write!(
            html,
            "<table style=\"width:100%;margin:16px 0;\" cellpadding=\"0\" cellspacing=\"0\">\
             {}{}\
             <tr><td style=\"padding:8px 14px;color:#94a3b8;font-size:13px;\">IC Level</td>\
             <td style=\"padding:8px 14px;color:{};font-weight:700;font-size:18px;\">{} &mdash; {}</td></tr>\
             </table>",
            detail_row("Submitted", &self.submitted_display()),
            detail_row("Time Spent", &self.time_spent),
            tier_color(tier),
            tier.level(),
            tier.title()
        );

        html.push_str(&heading("Score Breakdown"));
        html.push_str("<table style=\"width:100%;border-collapse:collapse;\" cellpadding=\"0\" cellspacing=\"0\">");
        for phase in &self.phases {
            let _ = write!(
                html,
                "<tr style=\"background-color:#1a1a2e;\">\
                 <td colspan=\"3\" style=\"padding:10px 14px;font-weight:bold;color:#f59e0b;border-bottom:1px solid #333;\">\
                 Phase {}: {} &mdash; {}/{} ({}%)</td></tr>",
                phase.id,
                escape_html(&phase.name),
                phase.tally.correct,
                phase.tally.total,
                phase.tally.percentage()
            );
            for section in &phase.sections {
                let color = band_color(section.tally.band());
                let _ = write!(
                    html,
                    "<tr><td style=\"padding:8px 14px 8px 28px;color:#ccc;border-bottom:1px solid #222;\">Section {}: {}</td>\
                     <td style=\"padding:8px 14px;text-align:center;color:{color};font-weight:600;border-bottom:1px solid #222;\">{}/{}</td>\
                     <td style=\"padding:8px 14px;text-align:center;color:{color};font-weight:600;border-bottom:1px solid #222;\">{}%</td></tr>",
                    escape_html(section.id.as_str()),
                    escape_html(&section.name),
                    section.tally.correct,
                    section.tally.total,
                    section.tally.percentage()
                );
            }
        }
        html.push_str("</table>");

        html.push_str(&heading("Answer Review"));
        for line in &self.review {
            let (icon, background, border) = if line.is_correct() {
                ("&#9989;", "rgba(34,197,94,0.08)", "#22c55e")
            } else {
                ("&#10060;", "rgba(239,68,68,0.08)", "#ef4444")
            };
            let _ = write!(
                html,
                "<div style=\"padding:10px 14px;margin-bottom:4px;background:{background};border-left:3px solid {border};border-radius:4px;\">\
                 <span style=\"color:#ccc;\">{icon} <strong>Q{}</strong>: {}</span><br/>\
                 <span style=\"font-size:12px;color:#999;\">Your answer: <strong>{}</strong> | Correct: <strong>{}</strong></span></div>",
                line.id,
                escape_html(&line.excerpt),
                line.selected_label(),
                line.correct
            );
        }

        html.push_str(
            "<p style=\"text-align:center;color:#64748b;font-size:12px;margin-top:32px;\">\
             Sent automatically by the Technical Assessment platform.</p></div>",
        );
        html
    }

    /// Plain-text alternative body.
    #[must_use]
    pub fn render_text(&self) -> String {
        let tier = self.tier();
        let mut text = String::new();

        let _ = writeln!(text, "{} Results", self.title);
        if let Some(subtitle) = &self.subtitle {
            let _ = writeln!(text, "{subtitle}");
        }
        let _ = writeln!(
            text,
            "\nScore: {}% ({} / {} correct)",
            self.percentage(),
            self.scores.total_correct(),
            self.scores.total_questions()
        );
        let _ = writeln!(text, "Submitted: {}", self.submitted_display());
        let _ = writeln!(text, "Time Spent: {}", self.time_spent);
        let _ = writeln!(text, "IC Level: {} - {}", tier.level(), tier.title());

        let _ = writeln!(text, "\nScore Breakdown");
        for phase in &self.phases {
            let _ = writeln!(
                text,
                "Phase {}: {} - {}/{} ({}%)",
                phase.id,
                phase.name,
                phase.tally.correct,
                phase.tally.total,
                phase.tally.percentage()
            );
            for section in &phase.sections {
                let _ = writeln!(
                    text,
                    "  Section {}: {} - {}/{} ({}%)",
                    section.id,
                    section.name,
                    section.tally.correct,
                    section.tally.total,
                    section.tally.percentage()
                );
            }
        }

        let _ = writeln!(text, "\nAnswer Review");
        for line in &self.review {
            let mark = if line.is_correct() { "[x]" } else { "[ ]" };
            let _ = writeln!(
                text,
                "{mark} Q{}: {} | Your answer: {} | Correct: {}",
                line.id,
                line.excerpt,
                line.selected_label(),
                line.correct
            );
        }
        text
    }
}

//
// ─── HELPERS ──────────────────────────────────────────────────────────────────
//

fn report_offset() -> FixedOffset {
    FixedOffset::east_opt(REPORT_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn band_color(band: PerformanceBand) -> &'static str {
    match band {
        PerformanceBand::High => "#22c55e",
        PerformanceBand::Medium => "#f59e0b",
        PerformanceBand::Low => "#ef4444",
    }
}

fn tier_color(tier: ProficiencyTier) -> &'static str {
    match tier {
        ProficiencyTier::Ic4 => "#22c55e",
        ProficiencyTier::Ic3 => "#06b6d4",
        ProficiencyTier::Ic2 => "#f59e0b",
        ProficiencyTier::Ic1 => "#ef4444",
    }
}

fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding:8px 14px;color:#94a3b8;font-size:13px;\">{label}</td>\
         <td style=\"padding:8px 14px;color:#e2e8f0;font-weight:500;\">{}</td></tr>",
        escape_html(value)
    )
}

fn heading(text: &str) -> String {
    format!(
        "<h2 style=\"color:#f59e0b;font-size:18px;margin-top:32px;border-bottom:1px solid #333;padding-bottom:8px;\">{text}</h2>"
    )
}
