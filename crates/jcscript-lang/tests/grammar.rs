//! Whole-script recognition tests.
//!
//! Each test compiles a script and checks which lines became statements, in
//! what order, and which were dropped as unrecognized.

use jcscript_lang::syntax::ast::{Command, LetValue, PropertyValue};
use jcscript_lang::{compile, ErrorCode, Script};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn tags(script: &Script) -> Vec<&'static str> {
    script.statements.iter().map(|s| s.command.tag()).collect()
}

fn missed_lines(script: &Script) -> Vec<usize> {
    script.unrecognized.iter().map(|u| u.line).collect()
}

fn single(src: &str) -> Command {
    let script = compile(src);
    assert!(script.unrecognized.is_empty(), "unrecognized: {:#?}", script.unrecognized);
    assert_eq!(script.statements.len(), 1, "expected exactly one statement");
    script.statements.into_iter().next().map(|s| s.command).unwrap()
}

fn misses(src: &str) {
    let script = compile(src);
    assert!(script.statements.is_empty(), "`{src}` should not parse, got {:?}", tags(&script));
    assert_eq!(script.unrecognized.len(), 1);
}

// ─── Every form ──────────────────────────────────────────────────────────────

#[test]
fn every_command_form_is_recognized() {
    let script = compile(r#"
say "Hello"
make it blue
make background #101010
draw circle at (100,100) radius 30
draw line from (50,50) to (150,150) width 5
play sound "pop.sound"
let box = spawn 50 50 40 40
let sprite = image "ufo.image" at (10,10) size 64 64
let label = text "Score" at (20,40) size 20 colour black font "Arial"
let score = 0
let roll = random from 1 to 6
score = score + roll
box.x = box.x + 5
add score -1
random from 1 to 10
rotate box by 15 degrees
on click say "clicked"
every 2 seconds then add score 1
if key "ArrowLeft" down then box.x = box.x - 2
"#);
    assert!(script.unrecognized.is_empty(), "{:#?}", script.unrecognized);
    assert_eq!(tags(&script), [
        "say", "make-it", "make-background", "draw-circle", "draw-line", "play-sound",
        "spawn", "image-decl", "text-decl", "let", "let-random", "assign",
        "property-assign", "add", "random", "rotate", "on-click", "every", "key-guard",
    ]);
}

#[test]
fn statements_keep_source_lines() {
    let script = compile("// header\n\nlet a = 1\n   \nadd a 2\n");
    let lines: Vec<usize> = script.statements.iter().map(|s| s.line).collect();
    assert_eq!(lines, [3, 5]);
}

#[test]
fn only_key_guards_are_per_frame() {
    let script = compile(r#"
let a = spawn 0 0 1 1
if key "w" down then a.y = a.y - 1
every 1 seconds then a.x = a.x + 1
on click a.x = 0
if key "s" down then add n 1
"#);
    let flags: Vec<bool> = script.statements.iter().map(|s| s.per_frame).collect();
    assert_eq!(flags, [false, true, false, false, true]);
    assert_eq!(script.setup_statements().count(), 3);
    assert_eq!(script.per_frame_statements().count(), 2);
}

#[test]
fn trailing_comments_are_ignored() {
    match single("let speed = 4 // pixels per frame") {
        Command::Let { name, value: LetValue::Number(_) } => assert_eq!(name, "speed"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn trailing_comments_stay_out_of_raw_text() {
    assert!(matches!(single("make it red // accent"), Command::SetColor(c) if c == "red"));
    assert!(matches!(single("make background #101010 // night"), Command::Background(c) if c == "#101010"));
    assert!(matches!(single(r#"say "hi" // greet"#), Command::Say(s) if s == "hi"));
    assert!(matches!(single(r#"say "a // b""#), Command::Say(s) if s == "a // b"));

    match single("label.colour = white // after a hit") {
        Command::SetProperty(assign) => {
            assert!(matches!(assign.value, PropertyValue::Color(ref c) if c == "white"));
        }
        other => panic!("unexpected {other:?}"),
    }
    match single("score = score + 1 // tally") {
        Command::Assign { value, .. } => {
            assert_eq!(value.text, "score + 1");
            assert!(value.parsed.is_ok());
        }
        other => panic!("unexpected {other:?}"),
    }
    match single("every 1 seconds then make it blue // flash") {
        Command::Every { action, .. } => assert!(matches!(*action, Command::SetColor(ref c) if c == "blue")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn say_accepts_any_text() {
    assert!(matches!(single("say héllo wörld!"), Command::Say(s) if s == "héllo wörld!"));
}

#[test]
fn key_names_are_lowercased_at_parse_time() {
    assert!(matches!(
        single(r#"if key "ArrowRight" down then rotate box by 3 degrees"#),
        Command::KeyGuard { key, .. } if key == "arrowright"
    ));
}

#[test]
fn text_assignment_without_quotes_is_kept_raw() {
    match single(r#"scoreText.text = "Score: " + score"#) {
        Command::SetProperty(assign) => {
            assert!(matches!(assign.value, PropertyValue::Text(ref t) if t == r#""Score: " + score"#));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn coordinates_accept_expressions() {
    assert!(matches!(
        single("draw line from (a.x, a.y) to (a.x + a.w, a.y + a.h) width 1"),
        Command::DrawLine { .. }
    ));
}

// ─── Misses ──────────────────────────────────────────────────────────────────

#[test]
fn documented_but_unsupported_verbs_are_dropped() {
    misses("set velocity of ufo to x:0 y:100");
    misses("apply velocity to ufo");
    misses("accelerate ufo by x:0 y:-300");
    misses("destroy apple");
    misses("for each apple in game {");
    misses("check collision between head and apple then {");
    misses("every 2 seconds {");
    misses("on key \"ArrowUp\" {");
    misses("if apple.y > 400 then {");
    misses("}");
}

#[test]
fn malformed_actions_drop_the_whole_line() {
    misses("on click {");
    misses("every 0.5 seconds then fly");
    misses(r#"if key "a" down then"#);
}

#[test]
fn malformed_declarations_are_dropped() {
    misses(r#"let t = text "Score: " + score at (20,40) size 24 colour white font "Arial""#);
    misses("let head = circle at (200,200) size 20 20");
    misses("let p = spawn 1 2 3");
    misses("draw circle at 100,100 radius 3");
    misses(r#"play sound pop.sound"#);
    misses("random from 1.5 to 3");
}

#[test]
fn misses_record_line_and_reason() {
    let script = compile("let a = 1\nwobble a\n\nlet b = \"x\nadd a 1");
    assert_eq!(tags(&script), ["let", "add"]);
    assert_eq!(missed_lines(&script), [2, 4]);
    assert_eq!(script.unrecognized[0].text, "wobble a");
    assert_eq!(script.unrecognized[0].reason.code, ErrorCode::P001);
    assert_eq!(script.unrecognized[1].reason.code, ErrorCode::L002);
    assert!(script.unrecognized.iter().all(|u| u.reason.code.is_syntax()));
}

#[test]
fn misses_do_not_disturb_neighbours() {
    let script = compile(r#"
let score = 0
every 2 seconds {
    let x = 20 + random * 360
    set velocity of apple to x:0 y:100
}
add score 1
"#);
    assert_eq!(tags(&script), ["let", "let", "add"]);
    assert_eq!(missed_lines(&script), [3, 5, 6]);
}
