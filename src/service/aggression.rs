//! Rule-based aggression scoring.
//!
//! Produces the 1-100 pressure score for a session from the witness dossier
//! alone, before any question is asked. Pure keyword heuristics over the
//! case file text; no model call involved.

use crate::model::{AggressionAssessment, AggressionLevel, CaseSide, WitnessProfile};

const CONTRADICTION_SIGNALS: &[&str] = &[
    "denied",
    "denies",
    "claims",
    "maintains",
    "recant",
    "not a threat",
    "not involved",
    "not material",
    "did not disclose",
    "never disclosed",
    "no written record",
    "failed to",
    "did not file",
    "not investigated",
    "open and shut",
    "never been wrong",
];

const DUTY_FAILURE_SIGNALS: &[&str] = &[
    "brady",
    "did not disclose",
    "never disclosed",
    "no written record",
    "not filed",
    "did not file",
    "not investigated",
    "without review",
    "marked resolved",
];

const EVIDENCE_SIGNALS: &[&str] = &[
    "fingerprint",
    "shoeprint",
    "fiber",
    "exhibit",
    "morsel",
    "trail",
    "footage",
    "report",
    "audit",
    "text message",
    "slack",
    "email",
    "invoice",
    "recantation",
    "plea",
    "warrant",
    "lineup",
];

const THREAT_SIGNALS: &[&str] = &[
    "threat",
    "regret",
    "pay for",
    "hostile",
    "shouting",
    "threw",
    "angry",
    "confrontation",
    "karma",
];

const AUTHORITY_KEYWORDS: &[&str] = &[
    "sovereign",
    "queen",
    "lead",
    "senior",
    "chief",
    "detective",
    "officer",
];

/// Each signal counts at most once, however often it appears.
fn count_signals(text: &str, signals: &[&str]) -> i32 {
    let lower = text.to_lowercase();
    signals.iter().filter(|&&s| lower.contains(s)).count() as i32
}

/// Score a witness dossier onto the 1-100 aggression scale.
pub fn score_witness(witness: &WitnessProfile) -> AggressionAssessment {
    let role = witness.witness_role.to_lowercase();
    let corpus = format!(
        "{} {} {}",
        witness.extracted_facts, witness.prior_statements, witness.exhibit_list
    );

    let mut score: i32 = 0;
    let mut reasons = Vec::new();

    let is_defendant = role.contains("defendant");
    let is_expert = role.contains("expert");
    let is_prosecution_side = witness.side == CaseSide::Prosecution;
    let is_defense_side = witness.side == CaseSide::Defense;

    let focus_count = witness
        .focus_areas
        .split(',')
        .filter(|f| !f.trim().is_empty())
        .count();
    let contradiction_hits = count_signals(&corpus, CONTRADICTION_SIGNALS);
    let duty_hits = count_signals(&corpus, DUTY_FAILURE_SIGNALS);
    let evidence_hits = count_signals(&corpus, EVIDENCE_SIGNALS);
    let threat_hits = count_signals(&corpus, THREAT_SIGNALS);

    // Role baseline (0-30)
    if is_defendant {
        let base = 15 + (evidence_hits * 3).min(15);
        score += base;
        reasons.push(format!(
            "Defendant with {} evidence markers (+{})",
            evidence_hits, base
        ));
    } else if is_prosecution_side {
        score += 12;
        reasons.push("Hostile witness — opposing side (+12)".to_string());
    } else if is_defense_side && is_expert {
        score += 5;
        reasons.push("Friendly expert — minimal pressure needed (+5)".to_string());
    } else if is_defense_side {
        score += 8;
        reasons.push("Friendly fact witness (+8)".to_string());
    }

    // Duty failures (0-25)
    if duty_hits >= 3 {
        score += 25;
        reasons.push(format!(
            "Severe legal/procedural duty failures ({} signals) (+25)",
            duty_hits
        ));
    } else if duty_hits == 2 {
        score += 18;
        reasons.push(format!(
            "Multiple procedural failures ({} signals) (+18)",
            duty_hits
        ));
    } else if duty_hits == 1 {
        score += 8;
        reasons.push("Minor procedural concern (+8)".to_string());
    }

    // Contradictions (0-20)
    if contradiction_hits >= 5 {
        score += 20;
        reasons.push(format!(
            "Extreme prior-statement inconsistencies ({} hits) (+20)",
            contradiction_hits
        ));
    } else if contradiction_hits >= 3 {
        score += 15;
        reasons.push(format!(
            "Heavy prior-statement inconsistencies ({} hits) (+15)",
            contradiction_hits
        ));
    } else if contradiction_hits >= 2 {
        score += 10;
        reasons.push(format!(
            "Notable contradictions ({} hits) (+10)",
            contradiction_hits
        ));
    } else if contradiction_hits == 1 {
        score += 4;
        reasons.push("Minor inconsistency in prior statements (+4)".to_string());
    }

    // Threat and emotional signals (0-10)
    if threat_hits >= 3 {
        score += 10;
        reasons.push(format!(
            "Strong emotional volatility signals ({} hits) (+10)",
            threat_hits
        ));
    } else if threat_hits >= 1 {
        score += 5;
        reasons.push(format!("Some emotional signals ({} hits) (+5)", threat_hits));
    }

    // Authority figure (0-8)
    if AUTHORITY_KEYWORDS.iter().any(|kw| role.contains(kw)) {
        score += 8;
        reasons.push("Authority figure — methodology and bias attackable (+8)".to_string());
    }

    // Attack surface (0-7)
    if focus_count >= 4 {
        score += 7;
        reasons.push(format!(
            "Very wide attack surface ({} focus areas) (+7)",
            focus_count
        ));
    } else if focus_count >= 3 {
        score += 5;
        reasons.push(format!(
            "Wide attack surface ({} focus areas) (+5)",
            focus_count
        ));
    } else if focus_count >= 2 {
        score += 3;
        reasons.push(format!(
            "Moderate attack surface ({} focus areas) (+3)",
            focus_count
        ));
    }

    // Exhibit density (0-10)
    if evidence_hits >= 6 {
        score += 10;
        reasons.push(format!(
            "Rich exhibit pool for confrontation ({} markers) (+10)",
            evidence_hits
        ));
    } else if evidence_hits >= 3 {
        score += 6;
        reasons.push(format!("Decent exhibit pool ({} markers) (+6)", evidence_hits));
    } else if evidence_hits >= 1 {
        score += 2;
        reasons.push(format!("Limited exhibits ({} markers) (+2)", evidence_hits));
    }

    // Friendly-witness dampener
    if is_defense_side && !is_defendant {
        let prior_lower = witness.prior_statements.to_lowercase();
        let no_prior = prior_lower.contains("no prior sworn")
            || prior_lower.contains("has not made prior");
        if is_expert {
            score -= 15;
            reasons.push("Friendly expert — dampened (-15)".to_string());
        } else if no_prior {
            score -= 12;
            reasons.push(
                "Friendly fact witness, no prior sworn statements — dampened (-12)".to_string(),
            );
        } else {
            score -= 8;
            reasons.push("Friendly fact witness — dampened (-8)".to_string());
        }
    }

    let score = score.clamp(1, 100) as u8;

    AggressionAssessment {
        score,
        level: AggressionLevel::from_score(score),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(side: CaseSide, role: &str) -> WitnessProfile {
        WitnessProfile {
            witness_name: "Dana Ryce".to_string(),
            side,
            witness_role: role.to_string(),
            extracted_facts: String::new(),
            prior_statements: String::new(),
            exhibit_list: String::new(),
            focus_areas: String::new(),
        }
    }

    #[test]
    fn test_hostile_authority_with_failures_scores_elevated() {
        let witness = WitnessProfile {
            extracted_facts: "Claims the file was complete. The second warrant was never \
                              disclosed and there is no written record of the audit."
                .to_string(),
            focus_areas: "chain of custody, warrant timing".to_string(),
            ..profile(CaseSide::Prosecution, "lead detective")
        };

        let assessment = score_witness(&witness);

        // 12 hostile + 18 duty + 15 contradictions + 8 authority + 3 focus + 2 exhibits
        assert_eq!(assessment.score, 58);
        assert_eq!(assessment.level, AggressionLevel::Elevated);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "Hostile witness — opposing side (+12)"));
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "Multiple procedural failures (2 signals) (+18)"));
    }

    #[test]
    fn test_friendly_expert_dampens_to_floor() {
        let witness = profile(CaseSide::Defense, "medical expert");

        let assessment = score_witness(&witness);

        assert_eq!(assessment.score, 1);
        assert_eq!(assessment.level, AggressionLevel::Standard);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "Friendly expert — dampened (-15)"));
    }

    #[test]
    fn test_defendant_evidence_markers_raise_baseline() {
        let witness = WitnessProfile {
            extracted_facts: "Exhibit 4 shows the email thread, the invoice, and the text \
                              message; security footage and the audit report round out the file."
                .to_string(),
            ..profile(CaseSide::Defense, "defendant")
        };

        let assessment = score_witness(&witness);

        // 30 defendant baseline (capped evidence bonus) + 10 rich exhibit pool
        assert_eq!(assessment.score, 40);
        assert!(assessment
            .reasons
            .iter()
            .any(|r| r == "Defendant with 7 evidence markers (+30)"));
    }

    #[test]
    fn test_score_bands_map_to_levels() {
        assert_eq!(AggressionLevel::from_score(1), AggressionLevel::Standard);
        assert_eq!(AggressionLevel::from_score(33), AggressionLevel::Standard);
        assert_eq!(AggressionLevel::from_score(34), AggressionLevel::Elevated);
        assert_eq!(AggressionLevel::from_score(66), AggressionLevel::Elevated);
        assert_eq!(AggressionLevel::from_score(67), AggressionLevel::HighStakes);
        assert_eq!(AggressionLevel::from_score(100), AggressionLevel::HighStakes);
    }
}
