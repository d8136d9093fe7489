use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn script(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp script");
    write!(file, "{contents}").expect("write temp script");
    file
}

fn lox() -> Command {
    Command::cargo_bin("lox-interpreter-rs").expect("binary builds")
}

#[test]
fn prints_arithmetic_result() {
    let file = script("print 1 + 2 * 3;");
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("7"));
}

#[test]
fn string_concatenation() {
    let file = script(r#"var a = "hi"; print a + ", world";"#);
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("hi, world"));
}

#[test]
fn recursive_fibonacci() {
    let file = script(
        "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);",
    );
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("55"));
}

#[test]
fn closures_keep_independent_counters_per_call() {
    let file = script(
        "fun makeCounter() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
         var c = makeCounter(); print c(); print c();",
    );
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n2\n"));
}

#[test]
fn class_method_call() {
    let file = script(r#"class Cake { taste() { print "yum"; } } Cake().taste();"#);
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("yum"));
}

#[test]
fn superclass_method_dispatch() {
    let file = script(
        r#"class A { speak() { print "A"; } } class B < A { speak() { super.speak(); print "B"; } } B().speak();"#,
    );
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("A\nB\n"));
}

#[test]
fn break_stops_the_innermost_loop() {
    let file = script("var i = 0; while (true) { i = i + 1; if (i == 3) break; } print i;");
    lox()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn static_error_exits_65() {
    let file = script("var a = a;");
    lox().arg(file.path()).assert().code(65);
}

#[test]
fn runtime_error_exits_70() {
    let file = script("print 1 / 0;");
    lox().arg(file.path()).assert().code(70);
}

#[test]
fn unbound_break_is_a_static_error() {
    let file = script("break;");
    lox().arg(file.path()).assert().code(65);
}

#[test]
fn closure_defined_in_one_file_works_when_called_from_another() {
    let a = script(
        "fun makeCounter() { var i = 0; fun c() { i = i + 1; return i; } return c; } \
         var c = makeCounter();",
    );
    let b = script("print c(); print c();");
    lox()
        .arg(a.path())
        .arg(b.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1\n2\n"));
}
