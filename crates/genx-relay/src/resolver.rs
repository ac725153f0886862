//! Emitters for the root resolver and the per-node resolver scaffolds.
//!
//! The root file wires one sub-resolver per node and owns the request
//! scope: batch loaders, the database handle, and the transaction opener.
//! Each node file carries pagination setup, loader plumbing, CRUD stubs,
//! relation traversal, and the viewer-permission stub. Everything is a
//! hook target for the surgery pass, so shapes stay simple and regular.

use std::fmt::Write as _;

use apollo_compiler::ast::FieldDefinition;
use genx_core::{File, Result};

use crate::node::{Data, NodeView};
use crate::util::{camel_case, pascal_case, plural, snake_case};
use crate::HEADER;

pub(crate) fn root_resolver_file(data: &Data<'_>) -> Result<File> {
    let module = data.go_module;
    let mut out = String::new();
    let _ = writeln!(out, "// {HEADER}");
    out.push_str("\npackage resolver\n\n");
    let _ = writeln!(
        out,
        "import (\n\
         \t\"context\"\n\
         \t\"database/sql/driver\"\n\
         \t\"net/http\"\n\
         \n\
         \t\"{module}/pkg/gqlx\"\n\
         \t\"{module}/server/model\"\n\
         \t\"github.com/pkg/errors\"\n\
         \t\"github.com/rs/xid\"\n\
         \t\"github.com/vektah/gqlparser/v2/ast\"\n\
         \t\"github.com/vikstrous/dataloadgen\"\n\
         \t\"gorm.io/gorm\"\n\
         )\n"
    );

    out.push_str("type Resolver struct {\n\tdb *gorm.DB\n");
    for node in &data.nodes {
        let name = node.name();
        let _ = writeln!(out, "\t{name} *{name}Resolver");
    }
    out.push_str("}\n\n");

    out.push_str("func New(db *gorm.DB) *Resolver {\n\tr := &Resolver{db: db}\n");
    for node in &data.nodes {
        let name = node.name();
        let _ = writeln!(out, "\tr.{name} = New{name}Resolver(r)");
    }
    out.push_str("\treturn r\n}\n\n");

    out.push_str("type Loader struct {\n");
    for node in &data.nodes {
        let name = node.name();
        let _ = writeln!(out, "\t{name} *dataloadgen.Loader[string, *model.{name}]");
    }
    out.push_str("}\n\n");

    out.push_str("type (\n\tctxKeyDB struct{}\n\tctxKeyTx struct{}\n\tctxKeyLoader struct{}\n)\n\n");

    out.push_str(
        "func (r *Resolver) Middleware(next http.Handler) http.Handler {\n\
         \treturn http.HandlerFunc(func(w http.ResponseWriter, req *http.Request) {\n\
         \t\tloader := &Loader{\n",
    );
    for node in &data.nodes {
        let name = node.name();
        let _ = writeln!(out, "\t\t\t{name}: r.{name}.NewLoader(),");
    }
    out.push_str(
        "\t\t}\n\
         \t\tctx := context.WithValue(req.Context(), ctxKeyLoader{}, loader)\n\
         \t\tctx = context.WithValue(ctx, ctxKeyDB{}, r.db.WithContext(ctx))\n\
         \t\tnext.ServeHTTP(w, req.WithContext(ctx))\n\
         \t})\n\
         }\n\n",
    );

    out.push_str(
        "func (r *Resolver) Loader(ctx context.Context) *Loader {\n\
         \tloader, _ := ctx.Value(ctxKeyLoader{}).(*Loader)\n\
         \tif loader == nil {\n\
         \t\tpanic(errors.New(\"loader not found in context\"))\n\
         \t}\n\
         \treturn loader\n\
         }\n\n",
    );

    out.push_str(
        "func (r *Resolver) DB(ctx context.Context) *gorm.DB {\n\
         \tdb, _ := ctx.Value(ctxKeyTx{}).(*gorm.DB)\n\
         \tif db == nil {\n\
         \t\tdb, _ = ctx.Value(ctxKeyDB{}).(*gorm.DB)\n\
         \t}\n\
         \tif db == nil {\n\
         \t\tpanic(errors.New(\"db not found in context\"))\n\
         \t}\n\
         \treturn db\n\
         }\n\n",
    );

    // One transaction per top-level mutation operation.
    out.push_str(
        "func (r *Resolver) OpenTx(ctx context.Context, op *ast.OperationDefinition) (context.Context, driver.Tx, error) {\n\
         \ttx := r.db.WithContext(ctx).Begin()\n\
         \tif tx.Error != nil {\n\
         \t\treturn ctx, nil, errors.Wrap(tx.Error, \"failed to begin transaction\")\n\
         \t}\n\
         \tctx = context.WithValue(ctx, ctxKeyTx{}, tx)\n\
         \treturn ctx, gqlx.Tx(\n\
         \t\tfunc() error { return tx.Commit().Error },\n\
         \t\tfunc() error { return tx.Rollback().Error },\n\
         \t), nil\n\
         }\n\n",
    );

    out.push_str("func generateID() string {\n\treturn xid.New().String()\n}\n");

    Ok(File::new("server/resolver/resolver.genx.go", out))
}

/// Relative path of the resolver file for `node`.
pub(crate) fn node_resolver_path(node: &NodeView<'_>) -> String {
    format!("server/resolver/{}_resolver.genx.go", snake_case(node.name()))
}

#[allow(clippy::too_many_lines)]
pub(crate) fn node_resolver_file(data: &Data<'_>, node: &NodeView<'_>) -> Result<File> {
    let module = data.go_module;
    let name = node.name();
    let var = camel_case(name);
    let vars = camel_case(&plural(name));
    let resolver = format!("{name}Resolver");

    let mut out = String::new();
    let _ = writeln!(out, "// {HEADER}");
    out.push_str("\npackage resolver\n\n");
    let _ = writeln!(
        out,
        "import (\n\
         \t\"context\"\n\
         \t\"time\"\n\
         \n\
         \t\"{module}/pkg/gqlx\"\n\
         \t\"{module}/server/model\"\n\
         \t\"github.com/pkg/errors\"\n\
         \t\"github.com/samber/lo\"\n\
         \t\"github.com/theplant/relay\"\n\
         \t\"github.com/theplant/relay/cursor\"\n\
         \t\"github.com/theplant/relay/gormrelay\"\n\
         \t\"github.com/vikstrous/dataloadgen\"\n\
         \t\"gorm.io/gorm\"\n\
         )\n"
    );

    let _ = writeln!(
        out,
        "type {resolver} struct {{\n\t*Resolver\n\tpagination relay.Pagination[*model.{name}]\n}}\n"
    );
    let _ = writeln!(
        out,
        "func New{resolver}(r *Resolver) *{resolver} {{\n\
         \tc := &{resolver}{{Resolver: r}}\n\
         \tc.initPagination()\n\
         \treturn c\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) initPagination() {{\n\
         \tc.pagination = relay.New(\n\
         \t\tcursor.Base64(func(ctx context.Context, req *relay.ApplyCursorsRequest) (*relay.ApplyCursorsResponse[*model.{name}], error) {{\n\
         \t\t\treturn gormrelay.NewKeysetAdapter[*model.{name}](c.DB(ctx))(ctx, req)\n\
         \t\t}}),\n\
         \t\trelay.EnsureLimits[*model.{name}](100, 10),\n\
         \t\trelay.EnsurePrimaryOrderBy[*model.{name}](\n\
         \t\t\trelay.OrderBy{{Field: \"CreatedAt\", Desc: false}},\n\
         \t\t),\n\
         \t)\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) batchRead(ctx context.Context, ids []string) ([]*model.{name}, []error) {{\n\
         \tif len(ids) == 0 {{\n\
         \t\treturn []*model.{name}{{}}, nil\n\
         \t}}\n\
         \n\
         \tdb := c.DB(ctx)\n\
         \n\
         \tvar {vars} []*model.{name}\n\
         \tif err := db.Find(&{vars}, \"id IN ?\", ids).Error; err != nil {{\n\
         \t\treturn nil, []error{{errors.Wrap(err, \"failed to find {vars}\")}}\n\
         \t}}\n\
         \n\
         \tidTo{name} := make(map[string]*model.{name}, len({vars}))\n\
         \tfor _, {var} := range {vars} {{\n\
         \t\tidTo{name}[{var}.ID] = {var}\n\
         \t}}\n\
         \n\
         \tresult := make([]*model.{name}, len(ids))\n\
         \tfor i, id := range ids {{\n\
         \t\tresult[i] = idTo{name}[id]\n\
         \t}}\n\
         \treturn result, nil\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) NewLoader() *dataloadgen.Loader[string, *model.{name}] {{\n\
         \treturn dataloadgen.NewLoader(\n\
         \t\tc.batchRead,\n\
         \t\tdataloadgen.WithBatchCapacity(100),\n\
         \t\tdataloadgen.WithWait(5*time.Millisecond),\n\
         \t)\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) Loader(ctx context.Context) *dataloadgen.Loader[string, *model.{name}] {{\n\
         \treturn c.Resolver.Loader(ctx).{name}\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) Get(ctx context.Context, id *string) (*model.{name}, error) {{\n\
         \tif id == nil {{\n\
         \t\treturn nil, nil\n\
         \t}}\n\
         \treturn c.Loader(ctx).Load(ctx, *id)\n\
         }}\n"
    );

    let _ = writeln!(
        out,
        "func (c *{resolver}) List(ctx context.Context, after *string, first *int, before *string, last *int, _ *model.{name}Filter, orderBy []*model.{name}Order) (*model.{name}Connection, error) {{\n\
         \treturn c.pagination.Paginate(\n\
         \t\trelay.WithNodeProcessor(\n\
         \t\t\tgqlx.WithSkippedConnection(ctx),\n\
         \t\t\tfunc(node *model.{name}) *model.{name} {{\n\
         \t\t\t\tc.Loader(ctx).Prime(node.ID, node)\n\
         \t\t\t\treturn node\n\
         \t\t\t}},\n\
         \t\t),\n\
         \t\t&relay.PaginateRequest[*model.{name}]{{\n\
         \t\t\tFirst: first, After: after, Last: last, Before: before,\n\
         \t\t\tOrderBys: lo.Map(orderBy, func(order *model.{name}Order, _ int) relay.OrderBy {{\n\
         \t\t\t\treturn relay.OrderBy{{\n\
         \t\t\t\t\tField: lo.PascalCase(order.Field.String()),\n\
         \t\t\t\t\tDesc:  order.Direction == model.OrderDirectionDesc,\n\
         \t\t\t\t}}\n\
         \t\t\t}}),\n\
         \t\t}},\n\
         \t)\n\
         }}\n"
    );

    emit_relations(&mut out, node, &resolver, &var)?;
    emit_mutations(&mut out, node, &resolver, &var)?;

    let _ = writeln!(
        out,
        "func (c *{resolver}) first(ctx context.Context, id string) (*model.{name}, error) {{\n\
         \tdb := c.DB(ctx)\n\
         \n\
         \tvar {var} model.{name}\n\
         \tif err := db.First(&{var}, \"id = ?\", id).Error; err != nil {{\n\
         \t\tif errors.Is(err, gorm.ErrRecordNotFound) {{\n\
         \t\t\treturn nil, errors.Wrap(err, \"{var} not found\")\n\
         \t\t}}\n\
         \t\treturn nil, errors.Wrap(err, \"failed to fetch {var}\")\n\
         \t}}\n\
         \n\
         \treturn &{var}, nil\n\
         }}\n"
    );

    emit_validate(&mut out, node, &resolver, &var)?;

    if let Some(vp) = node.viewer_permission() {
        let _ = writeln!(
            out,
            "func (c *{resolver}) ViewerPermission(ctx context.Context, {var} *model.{name}) (*model.{name}ViewerPermission, error) {{\n\
             \treturn &model.{name}ViewerPermission{{"
        );
        for field in vp.fields() {
            let _ = writeln!(out, "\t\t{}: true,", field.go_name());
        }
        out.push_str("\t}, nil\n}\n");
    }

    Ok(File::new(node_resolver_path(node), out))
}

/// One-to-one traversal delegates to the target's `Get`; one-to-many
/// delegates to the target's `List` with the caller's pagination arguments.
fn emit_relations(
    out: &mut String,
    node: &NodeView<'_>,
    resolver: &str,
    var: &str,
) -> Result<()> {
    let name = node.name();

    for field in node.one_to_one() {
        let target = field.ty.inner_named_type().as_str();
        let method = pascal_case(field.name.as_str());
        let id_field = node.project(field).go_name();
        let arg = if field.ty.is_non_null() {
            format!("&{var}.{id_field}")
        } else {
            format!("{var}.{id_field}")
        };
        let _ = writeln!(
            out,
            "func (c *{resolver}) {method}(ctx context.Context, {var} *model.{name}) (*model.{target}, error) {{\n\
             \treturn c.Resolver.{target}.Get(ctx, {arg})\n\
             }}\n"
        );
    }

    for field in node.one_to_many() {
        let connection = field.ty.inner_named_type().as_str();
        let Some(target) = connection.strip_suffix("Connection") else {
            continue;
        };
        let method = pascal_case(field.name.as_str());
        let _ = writeln!(
            out,
            "func (c *{resolver}) {method}(ctx context.Context, {var} *model.{name}, after *string, first *int, before *string, last *int, filterBy *model.{target}Filter, orderBy []*model.{target}Order) (*relay.Connection[*model.{target}], error) {{\n\
             \treturn c.Resolver.{target}.List(ctx, after, first, before, last, filterBy, orderBy)\n\
             }}\n"
        );
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn emit_mutations(
    out: &mut String,
    node: &NodeView<'_>,
    resolver: &str,
    var: &str,
) -> Result<()> {
    let name = node.name();

    if let Some(input) = node.create_input() {
        let _ = writeln!(
            out,
            "func (c *{resolver}) new(_ context.Context, input model.Create{name}Input) *model.{name} {{\n\
             \treturn &model.{name}{{\n\
             \t\tID: generateID(),"
        );
        for field in input.fields() {
            let go_name = field.go_name();
            let _ = writeln!(out, "\t\t{go_name}: input.{go_name},");
        }
        out.push_str("\t}\n}\n\n");

        let _ = writeln!(
            out,
            "func (c *{resolver}) create(ctx context.Context, {var} *model.{name}) error {{\n\
             \tdb := c.DB(ctx)\n\
             \tif err := db.Create({var}).Error; err != nil {{\n\
             \t\treturn errors.Wrap(err, \"failed to create {var}\")\n\
             \t}}\n\
             \tc.Loader(ctx).Prime({var}.ID, {var})\n\
             \treturn nil\n\
             }}\n"
        );

        let _ = writeln!(
            out,
            "func (c *{resolver}) Create(ctx context.Context, input model.Create{name}Input) (*model.Create{name}Payload, error) {{\n\
             \t{var} := c.new(ctx, input)\n\
             \n\
             \tif err := c.validate(ctx, {var}); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \tif err := c.create(ctx, {var}); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \treturn &model.Create{name}Payload{{\n\
             \t\tClientMutationID: input.ClientMutationID,\n\
             \t\t{name}: {var},\n\
             \t}}, nil\n\
             }}\n"
        );
    }

    if let Some(input) = node.update_input() {
        let _ = writeln!(
            out,
            "func (c *{resolver}) unmarshal(_ context.Context, {var} *model.{name}, input model.Update{name}Input, inputFields map[string]any) error {{\n\
             \tfor field := range inputFields {{\n\
             \t\tswitch field {{"
        );
        for field in input.fields() {
            let go_name = field.go_name();
            let json = camel_case(&go_name);
            let model_is_pointer = node
                .field(&go_name)
                .map(|f| f.go_type())
                .transpose()?
                .is_some_and(|ty| ty.is_pointer());
            let deref = if model_is_pointer { "" } else { "*" };
            let _ = writeln!(
                out,
                "\t\tcase \"{json}\":\n\t\t\t{var}.{go_name} = {deref}input.{go_name}"
            );
        }
        out.push_str("\t\t}\n\t}\n\treturn nil\n}\n\n");

        let _ = writeln!(
            out,
            "func (c *{resolver}) update(ctx context.Context, {var} *model.{name}) error {{\n\
             \tdb := c.DB(ctx)\n\
             \tif err := db.Save({var}).Error; err != nil {{\n\
             \t\treturn errors.Wrap(err, \"failed to update {var}\")\n\
             \t}}\n\
             \tc.Loader(ctx).Prime({var}.ID, {var})\n\
             \treturn nil\n\
             }}\n"
        );

        let _ = writeln!(
            out,
            "func (c *{resolver}) Update(ctx context.Context, input model.Update{name}Input, inputFields map[string]any) (*model.Update{name}Payload, error) {{\n\
             \t{var}, err := c.first(ctx, input.{name}ID)\n\
             \tif err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \tif err := c.unmarshal(ctx, {var}, input, inputFields); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \tif err := c.validate(ctx, {var}); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \tif err := c.update(ctx, {var}); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \treturn &model.Update{name}Payload{{\n\
             \t\tClientMutationID: input.ClientMutationID,\n\
             \t\t{name}: {var},\n\
             \t}}, nil\n\
             }}\n"
        );
    }

    if node.delete_input().is_some() {
        let _ = writeln!(
            out,
            "func (c *{resolver}) delete(ctx context.Context, {var} *model.{name}) error {{\n\
             \tdb := c.DB(ctx)\n\
             \tif err := db.Delete(&{var}).Error; err != nil {{\n\
             \t\treturn errors.Wrap(err, \"failed to delete {var}\")\n\
             \t}}\n\
             \tc.Loader(ctx).Clear({var}.ID)\n\
             \treturn nil\n\
             }}\n"
        );

        let _ = writeln!(
            out,
            "func (c *{resolver}) Delete(ctx context.Context, input model.Delete{name}Input) (*model.Delete{name}Payload, error) {{\n\
             \t{var}, err := c.first(ctx, input.{name}ID)\n\
             \tif err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \tif err := c.delete(ctx, {var}); err != nil {{\n\
             \t\treturn nil, err\n\
             \t}}\n\
             \n\
             \treturn &model.Delete{name}Payload{{\n\
             \t\tClientMutationID: input.ClientMutationID,\n\
             \t\t{name}: {var},\n\
             \t}}, nil\n\
             }}\n"
        );
    }
    Ok(())
}

/// Referenced one-to-one rows must exist before a write sticks.
fn emit_validate(
    out: &mut String,
    node: &NodeView<'_>,
    resolver: &str,
    var: &str,
) -> Result<()> {
    let name = node.name();
    let _ = writeln!(
        out,
        "func (c *{resolver}) validate(ctx context.Context, {var} *model.{name}) error {{"
    );
    for field in node.one_to_one() {
        emit_reference_check(out, node, var, field);
    }
    out.push_str("\treturn nil\n}\n");
    Ok(())
}

fn emit_reference_check(out: &mut String, node: &NodeView<'_>, var: &str, field: &FieldDefinition) {
    let target = field.ty.inner_named_type().as_str();
    let local = camel_case(field.name.as_str());
    let id_field = node.project(field).go_name();
    if field.ty.is_non_null() {
        let _ = writeln!(
            out,
            "\tif {var}.{id_field} != \"\" {{\n\
             \t\t{local}, err := c.Resolver.{target}.Get(ctx, &{var}.{id_field})\n\
             \t\tif err != nil {{\n\
             \t\t\treturn err\n\
             \t\t}}\n\
             \t\tif {local} == nil {{\n\
             \t\t\treturn errors.New(\"{local} not found\")\n\
             \t\t}}\n\
             \t}}"
        );
    } else {
        let _ = writeln!(
            out,
            "\tif {var}.{id_field} != nil {{\n\
             \t\t{local}, err := c.Resolver.{target}.Get(ctx, {var}.{id_field})\n\
             \t\tif err != nil {{\n\
             \t\t\treturn err\n\
             \t\t}}\n\
             \t\tif {local} == nil {{\n\
             \t\t\treturn errors.New(\"{local} not found\")\n\
             \t\t}}\n\
             \t}}"
        );
    }
}
