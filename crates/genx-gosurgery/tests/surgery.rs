//! Surgery scenarios: duplicate elision, inline const/var elision, and
//! hook wrapping, each checked for exact rewritten text or re-parse
//! validity.

use genx_core::File;
use genx_gosurgery::surgery;
use genx_gosrc::decl::{parse_file, Decl};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn run(generated: &str, user: &str) -> String {
    let mut generated_files = vec![File::new("original.genx.go", generated)];
    let user_files = vec![File::new("user.go", user)];
    surgery(&mut generated_files, &user_files).expect("surgery should succeed");
    generated_files.remove(0).content
}

#[test]
fn duplicate_type_declaration_is_fully_commented() {
    let generated = indoc! {"
        package model

        type Foo struct {
        \tName string
        }
    "};
    let user = "package model\n\ntype Foo struct{}\n";

    let out = run(generated, user);
    let want = indoc! {"
        package model

        // type Foo struct {
        // \tName string
        // }
    "};
    assert_eq!(out, want);

    // The elided file still parses and declares nothing.
    assert!(parse_file(&out).unwrap().is_empty());
}

#[test]
fn hook_function_wraps_the_generated_body() {
    let generated = "package resolver\n\nfunc Create() {}\n";
    let user = "package resolver\n\nfunc hookCreate() {}\n";

    let out = run(generated, user);
    assert_eq!(
        out,
        "package resolver\n\nfunc Create() {\n\treturn hookCreate(func() {})()\n}\n"
    );
}

#[test]
fn multi_name_const_spec_elides_name_and_value_inline() {
    let generated = indoc! {"
        package model

        const (
        \tHEIGHT, WIDTH = 2.718, 3.0
        )
    "};
    let user = "package model\n\nconst HEIGHT = \"\"\n";

    let out = run(generated, user);
    assert!(
        out.contains("/* HEIGHT, */ WIDTH = /* 2.718, */ 3.0"),
        "unexpected output:\n{out}"
    );

    // WIDTH survives and resolves to 3.0.
    let decls = parse_file(&out).unwrap();
    let Decl::Gen(group) = &decls[0] else { panic!("expected const group") };
    let genx_gosrc::decl::Spec::Value(spec) = &group.specs[0] else {
        panic!("expected value spec")
    };
    assert_eq!(spec.names.len(), 1);
    assert_eq!(spec.names[0].name, "WIDTH");
    assert_eq!(spec.values.len(), 1);
    assert_eq!(spec.values[0].text(&out), "3.0");
}

#[test]
fn surgery_skips_directories_without_user_files() {
    let content = "package model\n\ntype Foo struct{}\n";
    let mut generated = vec![File::new("models.genx.go", content)];
    surgery(&mut generated, &[]).unwrap();
    assert_eq!(generated[0].content, content);
}

#[test]
fn combined_surgery_matches_expected_shapes() {
    let generated = indoc! {r#"
        package main

        import (
        	"context"
        )

        type Foo struct {
        	Name string
        }

        type (
        	Bar struct {
        		Age int
        	}

        	Baz struct {
        		Height int
        	}
        )

        const Length = 10

        const (
        	PI = 3.14
        	HEIGHT, WIDTH = 2.718, 3.0
        )

        var version = "1.0.0"

        var (
        	str0, str1 = "str0", "str1"
        	str5, str6 = "str5", "str6"
        )

        func Create() {}

        func create(ctx context.Context) *User {
        	return &User{}
        }

        func update() int {
        	// just update
        	return 0
        }

        type User struct {
        	Name string
        }

        func (u *User) Delete() (string, error) {
        	return "", nil /* just delete */
        }

        func (u *User) get(ctx context.Context) *User {
        	return &User{}
        }
    "#};

    let user = indoc! {r#"
        package main

        type Foo struct{}

        type Bar struct{}

        const HEIGHT = ""

        var version = "2.0.0"

        var str1 = "str1x"
        var str5 = "str5x"
        var str6 = "str6x"

        func Create() {}
        func hookCreate() {}
        func hookUpdate() {}

        func (u *User) HookDelete() {}
        func (u *User) hookGet() {}
    "#};

    let out = run(generated, user);

    // Fully colliding declarations become line comments.
    assert!(out.contains("// type Foo struct {"));
    assert!(out.contains("// var version = \"1.0.0\""));
    assert!(out.contains("// func Create() {}"));

    // Partially colliding type group loses only the colliding spec.
    assert!(out.contains("// Bar struct {"));
    assert!(out.contains("\tBaz struct {"));

    // Inline const elision keeps the survivors legal.
    assert!(out.contains("/* HEIGHT, */ WIDTH = /* 2.718, */ 3.0"));
    assert!(out.contains("PI = 3.14"));
    assert!(out.contains("const Length = 10"));

    // Var group: trailing-name collision and whole-spec collision.
    assert!(out.contains("str0/* , str1 */ = \"str0\"/* , \"str1\" */"));
    assert!(out.contains("// str5, str6 = \"str5\", \"str6\""));

    // Hook wrapping: free functions by either hook-name case.
    assert!(out.contains(
        "func create(ctx context.Context) *User {\n\treturn hookCreate(func(ctx context.Context) *User {\n\t\treturn &User{}\n\t})(ctx)\n}"
    ));
    assert!(out.contains(
        "func update() int {\n\treturn hookUpdate(func() int {\n\t\t// just update\n\t\treturn 0\n\t})()\n}"
    ));

    // Method hooks delegate through the receiver, comments preserved.
    assert!(out.contains(
        "func (u *User) Delete() (string, error) {\n\treturn u.HookDelete(func() (string, error) {\n\t\treturn \"\", nil /* just delete */\n\t})()\n}"
    ));
    assert!(out.contains(
        "func (u *User) get(ctx context.Context) *User {\n\treturn u.hookGet(func(ctx context.Context) *User {\n\t\treturn &User{}\n\t})(ctx)\n}"
    ));

    // The generated-only type survives untouched.
    assert!(out.contains("type User struct {\n\tName string\n}"));

    // The rewritten file still parses.
    parse_file(&out).expect("post-surgery output should parse");
}
