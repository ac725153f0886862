//! Emitter for `server/model/models.genx.go`.
//!
//! One record struct per node with gorm/json tags, `Edge`/`Connection`
//! aliases over the relay package, and an `AutoMigrate` helper covering
//! every node model. The formatter dispatcher canonicalizes the output, so
//! the emitter only cares about token order, not indentation.

use std::fmt::Write as _;

use genx_core::{File, Result};

use crate::node::Data;
use crate::HEADER;

pub(crate) fn models_file(data: &Data<'_>) -> Result<File> {
    let mut out = String::new();
    let _ = writeln!(out, "// {HEADER}");
    out.push_str("\npackage model\n\n");
    out.push_str(
        "import (\n\
         \t\"time\"\n\
         \n\
         \t\"github.com/pkg/errors\"\n\
         \t\"github.com/theplant/relay\"\n\
         \t\"gorm.io/driver/postgres\"\n\
         \t\"gorm.io/gorm\"\n\
         )\n\n",
    );
    out.push_str("type PageInfo = relay.PageInfo\n\n");

    for node in &data.nodes {
        let name = node.name();
        let _ = writeln!(out, "type {name} struct {{");
        for field in node.fields() {
            let _ = writeln!(
                out,
                "\t{} {} `{}`",
                field.go_name(),
                field.go_type()?,
                field.go_tag()
            );
        }
        out.push_str("}\n\n");

        let _ = writeln!(
            out,
            "type (\n\t{name}Edge = relay.Edge[*{name}]\n\t{name}Connection = relay.Connection[*{name}]\n)\n"
        );
    }

    out.push_str(
        "func AutoMigrate(dsn string) error {\n\
         \tif dsn == \"\" {\n\
         \t\treturn errors.New(\"database.dsn is required\")\n\
         \t}\n\
         \n\
         \tdb, err := gorm.Open(postgres.New(postgres.Config{DSN: dsn}), &gorm.Config{\n\
         \t\tDisableForeignKeyConstraintWhenMigrating: true,\n\
         \t})\n\
         \tif err != nil {\n\
         \t\treturn errors.Wrap(err, \"failed to open database connection\")\n\
         \t}\n\n",
    );
    let migrate_args: Vec<String> = data
        .nodes
        .iter()
        .map(|n| format!("&{}{{}}", n.name()))
        .collect();
    let _ = writeln!(
        out,
        "\tif err := db.AutoMigrate({}); err != nil {{\n\t\treturn err\n\t}}\n",
        migrate_args.join(", ")
    );
    out.push_str(
        "\tsqlDB, err := db.DB()\n\
         \tif err != nil {\n\
         \t\treturn errors.Wrap(err, \"failed to get database connection\")\n\
         \t}\n\
         \tif err := sqlDB.Close(); err != nil {\n\
         \t\treturn errors.Wrap(err, \"failed to close database connection\")\n\
         \t}\n\
         \treturn nil\n\
         }\n",
    );

    Ok(File::new("server/model/models.genx.go", out))
}
