use cefr_grader::{
    CefrBand,
    parser::{DEFAULT_COMMENTARY, parse_exam, parse_rubric, quantize},
};

#[test]
fn parses_well_formed_rubric() {
    let score = parse_rubric(
        "FLUENCY: 4\nLEXICAL: 3.5\nGRAMMAR: 4\nTASK: 5\nFEEDBACK: Clear structure and a polite \
         tone. Add a concrete delivery date.",
    );

    assert_eq!(score.fluency, 4.0);
    assert_eq!(score.lexical, 3.5);
    assert_eq!(score.grammar, 4.0);
    assert_eq!(score.task, 5.0);
    assert_eq!(
        score.feedback,
        "Clear structure and a polite tone. Add a concrete delivery date."
    );
}

#[test]
fn out_of_range_values_are_clamped() {
    let score = parse_rubric("FLUENCY: 0\nLEXICAL: 4\nGRAMMAR: 4\nTASK: 9.7\nFEEDBACK: ok");
    assert_eq!(score.task, 5.0);
    assert_eq!(score.fluency, 1.0);

    let negative = parse_rubric("GRAMMAR: -2");
    assert_eq!(negative.grammar, 1.0);
}

#[test]
fn values_round_to_half_points() {
    assert_eq!(parse_rubric("LEXICAL: 3.24").lexical, 3.0);
    assert_eq!(parse_rubric("LEXICAL: 3.26").lexical, 3.5);
    assert_eq!(quantize(4.74), 4.5);
    assert_eq!(quantize(4.76), 5.0);
}

#[test]
fn missing_field_defaults_to_three() {
    let score = parse_rubric("FLUENCY: 5\nLEXICAL: 4\nTASK: 2\nFEEDBACK: Fine.");
    assert_eq!(score.grammar, 3.0);
    assert_eq!(score.fluency, 5.0);
    assert_eq!(score.task, 2.0);
}

#[test]
fn unreadable_value_defaults_to_three() {
    let score = parse_rubric("FLUENCY: four\nLEXICAL: n/a");
    assert_eq!(score.fluency, 3.0);
    assert_eq!(score.lexical, 3.0);
}

#[test]
fn empty_reply_is_all_defaults() {
    let score = parse_rubric("");
    for (_, value) in score.dimensions() {
        assert_eq!(value, 3.0);
    }
    assert_eq!(score.feedback, DEFAULT_COMMENTARY);
}

#[test]
fn labels_tolerate_case_and_markdown() {
    let score = parse_rubric(
        "**Fluency:** 4\n**LEXICAL**: [3.5]\ngrammar : (4)\nTask: \"5\"\n**Feedback:** Good.",
    );
    assert_eq!(score.fluency, 4.0);
    assert_eq!(score.lexical, 3.5);
    assert_eq!(score.grammar, 4.0);
    assert_eq!(score.task, 5.0);
    assert_eq!(score.feedback, "Good.");
}

#[test]
fn feedback_is_stripped_of_brackets_and_quotes() {
    assert_eq!(
        parse_rubric("FEEDBACK: [Well organized email.]").feedback,
        "Well organized email."
    );
    assert_eq!(
        parse_rubric("FEEDBACK: \"Keep it shorter.\"").feedback,
        "Keep it shorter."
    );
    assert_eq!(parse_rubric("FEEDBACK: []").feedback, DEFAULT_COMMENTARY);
}

#[test]
fn feedback_stops_at_blank_line() {
    let score = parse_rubric(
        "FEEDBACK: Strong opening.\nThe closing is abrupt.\n\nNote: scores are provisional.",
    );
    assert_eq!(score.feedback, "Strong opening.\nThe closing is abrupt.");

    let crlf = parse_rubric("FEEDBACK: Concise.\r\n\r\nTrailing notes");
    assert_eq!(crlf.feedback, "Concise.");
}

#[test]
fn parses_exam_reply() {
    let result = parse_exam(
        "OVERALL_SCORE: C1\nEXPLANATION: Fluent writing across tasks. The dictation was exact.",
    );
    assert_eq!(result.overall_score, CefrBand::C1);
    assert_eq!(
        result.explanation,
        "Fluent writing across tasks. The dictation was exact."
    );
}

#[test]
fn exam_band_is_case_insensitive() {
    assert_eq!(parse_exam("overall_score: b1").overall_score, CefrBand::B1);
    assert_eq!(parse_exam("OVERALL_SCORE: [A2]").overall_score, CefrBand::A2);
    assert_eq!(parse_exam("**OVERALL_SCORE:** C2").overall_score, CefrBand::C2);
}

#[test]
fn exam_band_takes_leading_token() {
    assert_eq!(parse_exam("OVERALL_SCORE: B12").overall_score, CefrBand::B1);
    assert_eq!(parse_exam("OVERALL_SCORE: C1/C2").overall_score, CefrBand::C1);
}

#[test]
fn unknown_band_defaults_to_b2() {
    assert_eq!(parse_exam("OVERALL_SCORE: D3").overall_score, CefrBand::B2);
    assert_eq!(parse_exam("OVERALL_SCORE: excellent").overall_score, CefrBand::B2);

    let empty = parse_exam("");
    assert_eq!(empty.overall_score, CefrBand::B2);
    assert_eq!(empty.explanation, DEFAULT_COMMENTARY);
}
