//! Delete mode: selection pruning, ordering and the confirmation gate.

use crate::common::{FakeWorkspace, harness};
use dbsetup_core::{LifecycleStatus, PermissionLevel, ResourceKind, ResourceName};
use dbsetup_engine::{DeleteSelection, plan_delete, run_plan};
use pretty_assertions::assert_eq;

fn scope(name: &str) -> ResourceName {
    ResourceName::new(ResourceKind::Scope, name).unwrap()
}

fn cluster(name: &str) -> ResourceName {
    ResourceName::new(ResourceKind::Cluster, name).unwrap()
}

fn all() -> DeleteSelection {
    DeleteSelection {
        all: true,
        ..Default::default()
    }
}

fn finance_workspace() -> FakeWorkspace {
    FakeWorkspace::new()
        .with_scope("finance-secrets")
        .with_grant("finance-secrets", "scope-finance-secrets-read", PermissionLevel::Read)
        .with_grant("finance-secrets", "data-engineers", PermissionLevel::Write)
        .with_group("scope-finance-secrets-manage")
        .with_group("unrelated-group")
}

#[tokio::test]
async fn test_scope_delete_all_quiet() {
    let h = harness(finance_workspace(), "n");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), all())
        .await
        .unwrap();
    let report = run_plan(&h.ctx, &plan, false, true).await.unwrap().unwrap();

    assert!(h.confirm.prompts().is_empty());
    assert_eq!(
        h.workspace.mutations(),
        vec![
            "delete_grant scope-finance-secrets-read finance-secrets",
            "delete_grant data-engineers finance-secrets",
            "delete_group scope-finance-secrets-manage",
            "delete_resource scope finance-secrets",
        ]
    );
    assert_eq!(
        report.status_of(ResourceKind::Scope, "finance-secrets"),
        Some(LifecycleStatus::Absent)
    );
    assert_eq!(h.workspace.groups(), vec!["unrelated-group".to_string()]);
    assert!(h.workspace.scopes().is_empty());
}

#[tokio::test]
async fn test_scope_delete_render() {
    let h = harness(finance_workspace(), "n");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), all())
        .await
        .unwrap();

    let expected = "\
The following resources will be deleted:
Scopes:
\tfinance-secrets
Groups:
\tscope-finance-secrets-manage
Acls:
\tfinance-secrets:
\t\tscope-finance-secrets-read:   READ
\t\tdata-engineers:               WRITE
";
    assert_eq!(plan.render(), expected);
}

#[tokio::test]
async fn test_no_selection_is_empty_and_never_prompts() {
    let h = harness(finance_workspace(), "y");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), DeleteSelection::default())
        .await
        .unwrap();
    assert!(plan.is_empty());
    assert!(h.workspace.calls().is_empty());

    let report = run_plan(&h.ctx, &plan, false, false).await.unwrap();
    assert!(report.is_none());
    assert!(h.confirm.prompts().is_empty());
}

#[tokio::test]
async fn test_cluster_delete_orders_grants_groups_resource() {
    let workspace = FakeWorkspace::new()
        .with_cluster("0101-abc", "etl", LifecycleStatus::Running)
        .with_grant("0101-abc", "cluster-etl-manage", PermissionLevel::CanManage)
        .with_grant("0101-abc", "ops@example.com", PermissionLevel::CanRestart)
        .with_grant("0101-abc", "ops@example.com", PermissionLevel::CanAttachTo)
        .with_inherited_grant("0101-abc", "admins", PermissionLevel::CanManage)
        .with_group("cluster-etl-manage")
        .with_group("cluster-etl-restart")
        .with_group("cluster-etl-attach");
    let h = harness(workspace, "Y");

    let plan = plan_delete(h.ctx.gateway(), &cluster("ETL"), all()).await.unwrap();
    assert!(plan.render().contains("\t\tops@example.com:              CAN_ATTACH_TO, CAN_RESTART\n"));

    run_plan(&h.ctx, &plan, false, false).await.unwrap().unwrap();

    assert_eq!(h.confirm.prompts(), vec!["(Y/N)".to_string()]);
    assert_eq!(h.confirm.plans(), vec![plan.render()]);
    assert_eq!(
        h.workspace.mutations(),
        vec![
            "delete_grant cluster-etl-manage 0101-abc",
            "delete_grant ops@example.com 0101-abc",
            "delete_group cluster-etl-manage",
            "delete_group cluster-etl-restart",
            "delete_group cluster-etl-attach",
            "delete_resource cluster 0101-abc",
        ]
    );
}

#[tokio::test]
async fn test_groups_only_selection_prunes_other_categories() {
    let h = harness(finance_workspace(), "n");
    let selection = DeleteSelection {
        groups: true,
        ..Default::default()
    };

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), selection)
        .await
        .unwrap();

    let rendered = plan.render();
    assert!(rendered.contains("Groups:\n\tscope-finance-secrets-manage\n"));
    assert!(!rendered.contains("Scopes:"));
    assert!(!rendered.contains("Acls:"));
    assert!(!h.workspace.calls().iter().any(|c| c.starts_with("get_grants")));
}

#[tokio::test]
async fn test_empty_categories_are_dropped() {
    // Grants selected, but the scope only has inherited entries.
    let workspace = FakeWorkspace::new()
        .with_scope("kv")
        .with_inherited_grant("kv", "admins", PermissionLevel::Manage);
    let h = harness(workspace, "y");
    let selection = DeleteSelection {
        grants: true,
        groups: true,
        ..Default::default()
    };

    let plan = plan_delete(h.ctx.gateway(), &scope("kv"), selection).await.unwrap();
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_missing_resource_still_deletes_groups() {
    let workspace = FakeWorkspace::new().with_group("scope-gone-read");
    let h = harness(workspace, "y");

    let plan = plan_delete(h.ctx.gateway(), &scope("gone"), all()).await.unwrap();
    run_plan(&h.ctx, &plan, false, true).await.unwrap();

    assert_eq!(h.workspace.mutations(), vec!["delete_group scope-gone-read"]);
}

#[tokio::test]
async fn test_declined_prompt_applies_nothing() {
    let h = harness(finance_workspace(), "n");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), all())
        .await
        .unwrap();
    let report = run_plan(&h.ctx, &plan, false, false).await.unwrap();

    assert!(report.is_none());
    assert_eq!(h.confirm.prompts().len(), 1);
    assert!(h.workspace.mutations().is_empty());
}

#[tokio::test]
async fn test_debug_renders_without_applying() {
    let h = harness(finance_workspace(), "y");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), all())
        .await
        .unwrap();
    let report = run_plan(&h.ctx, &plan, true, true).await.unwrap();

    assert!(report.is_none());
    assert!(h.confirm.prompts().is_empty());
    assert!(h.workspace.mutations().is_empty());
    assert_eq!(h.output.contents(), plan.render());
}

#[tokio::test]
async fn test_failure_mid_delete_leaves_later_steps_undone() {
    let h = harness(finance_workspace().failing_on("delete_group"), "y");

    let plan = plan_delete(h.ctx.gateway(), &scope("finance-secrets"), all())
        .await
        .unwrap();
    let err = run_plan(&h.ctx, &plan, false, true).await.unwrap_err();

    assert!(err.to_string().contains("step 3"));
    assert!(
        !h.workspace
            .mutations()
            .iter()
            .any(|c| c.starts_with("delete_resource"))
    );
    assert_eq!(h.workspace.scopes().len(), 1);
}
