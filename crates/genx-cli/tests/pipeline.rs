//! Full-pipeline test: enhance → emit → surgery → write → cleanup against
//! a real temporary output tree.

use genx_core::{CleanupExtension, Config, Generator, Scope};
use genx_gosurgery::GosurgeryExtension;
use genx_relay::RelayExtension;

fn config(dir: &std::path::Path) -> Config {
    Config {
        output_dir: dir.to_path_buf(),
        prototype_rel_pattern: "prototype.graphql".to_string(),
        go_module: "example.com/app".to_string(),
    }
}

#[test]
fn generates_a_full_tree_with_surgery_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("prototype.graphql"),
        "type Company @node {\n  name: String!\n  employees: [User!]!\n}\n\n\
         type User @node {\n  name: String!\n  company: Company!\n}\n",
    )
    .unwrap();

    // Hand-written customizations already in the output tree: one override
    // and one hook provider.
    let resolver_dir = root.join("server/resolver");
    std::fs::create_dir_all(&resolver_dir).unwrap();
    std::fs::write(
        resolver_dir.join("company_resolver.go"),
        "package resolver\n\n\
         func (c *CompanyResolver) validate(ctx context.Context, company *model.Company) error {\n\
         \treturn nil\n\
         }\n\n\
         func (c *CompanyResolver) HookCreate() {}\n",
    )
    .unwrap();

    // A stale artifact from a previous run.
    let model_dir = root.join("server/model");
    std::fs::create_dir_all(&model_dir).unwrap();
    std::fs::write(model_dir.join("old.genx.go"), "package model\n").unwrap();

    Generator::new(config(root))
        .extension(RelayExtension::new())
        .extension(GosurgeryExtension::new())
        .extension(CleanupExtension::new())
        .run(&Scope::new())
        .unwrap();

    // Enhanced SDL is part of the output tree.
    let sdl = std::fs::read_to_string(root.join("schema.genx.graphql")).unwrap();
    assert!(sdl.contains("CompanyConnection"));
    assert!(sdl.contains("createUser"));
    assert!(!sdl.contains("@node"));

    // Models cover both nodes.
    let models = std::fs::read_to_string(model_dir.join("models.genx.go")).unwrap();
    assert!(models.contains("type Company struct {"));
    assert!(models.contains("CompanyID string `gorm:\"not null\" json:\"companyId\"`"));

    // Root resolver wires both nodes.
    let resolver = std::fs::read_to_string(resolver_dir.join("resolver.genx.go")).unwrap();
    assert!(resolver.contains("Company *CompanyResolver"));
    assert!(resolver.contains("User *UserResolver"));

    // Surgery commented the user-overridden validate and wrapped Create
    // through the hand-written hook.
    let company = std::fs::read_to_string(resolver_dir.join("company_resolver.genx.go")).unwrap();
    assert!(company.contains("// func (c *CompanyResolver) validate"));
    assert!(company.contains("c.HookCreate(func(ctx context.Context, input model.CreateCompanyInput)"));

    // The untouched user resolver got no surgery markers.
    let user = std::fs::read_to_string(resolver_dir.join("user_resolver.genx.go")).unwrap();
    assert!(!user.contains("// func"));

    // Cleanup swept the stale artifact but kept the user file.
    assert!(!model_dir.join("old.genx.go").exists());
    assert!(resolver_dir.join("company_resolver.go").exists());
}

#[test]
fn schema_invariant_violations_surface_from_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("prototype.graphql"),
        "type Company @node {\n  employees: [User!]\n}\n\ntype User @node {\n  name: String!\n}\n",
    )
    .unwrap();

    let err = Generator::new(config(dir.path()))
        .extension(RelayExtension::new())
        .run(&Scope::new())
        .unwrap_err();
    assert!(err.to_string().contains("Company.employees"));
}
