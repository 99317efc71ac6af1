// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::SetupFixture;

use ibexa_postinstall::{
    fs::FsError,
    install::InstallPhase,
    install_layered,
    path::installed_packages_file,
    product::ProductError,
    resource::ResourceError,
    setup::SetupError,
    version::VersionError,
    InstalledJson, LocalFilesystem, ProductIdentity, ResourceLayout, Setup,
};

use anyhow::Result;
use indicatif::ProgressBar;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

const EXPERIENCE_4_6: &str = indoc! {r#"
    {
        "packages": [
            { "name": "ibexa/oss", "version": "v4.6.2", "version_normalized": "4.6.2.0" },
            { "name": "ibexa/core", "version": "v4.6.2", "version_normalized": "4.6.2.0" },
            { "name": "ibexa/experience", "version": "v4.6.2", "version_normalized": "4.6.2.0" }
        ]
    }
"#};

fn setup(fixture: &SetupFixture) -> Setup {
    Setup::new(LocalFilesystem::new(), ResourceLayout::new(fixture.resource_root()))
}

fn registry(fixture: &SetupFixture) -> Result<InstalledJson> {
    Ok(InstalledJson::load(installed_packages_file(fixture.project_dir()))?)
}

#[test]
fn platform_sh_installs_matching_layers() -> Result<()> {
    let fixture = SetupFixture::new()?;
    fixture.installed(EXPERIENCE_4_6)?;
    fixture.resource("common", "3.3", ".platform.app.yaml", "common 3.3")?;
    fixture.resource("common", "4.6", ".platform.app.yaml", "common 4.6")?;
    fixture.resource("common", "4.6", ".platform/routes.yaml", "routes 4.6")?;
    fixture.resource("ibexa-experience", "4.5", ".platform/services.yaml", "services 4.5")?;
    fixture.resource("ibexa-experience", "4.6", ".platform/services.yaml", "services 4.6")?;
    fixture.resource("ibexa-experience", "4.6", ".platform.app.yaml", "experience 4.6")?;
    fixture.resource("ibexa-oss", "4.6", ".platform/services.yaml", "oss 4.6")?;
    fixture.project_file(".platform/routes.yaml", "user routes")?;

    let report = setup(&fixture).platform_sh(
        &registry(&fixture)?,
        fixture.project_dir(),
        &ProgressBar::hidden(),
    )?;

    assert_eq!(fixture.read(".platform.app.yaml")?, "experience 4.6");
    assert_eq!(fixture.read(".platform/routes.yaml")?, "routes 4.6");
    assert_eq!(fixture.read(".platform/services.yaml")?, "services 4.6");
    assert_eq!(report.common_copied(), 2);
    assert_eq!(report.specific_copied(), 2);

    let collisions = report
        .collisions()
        .map(|record| (record.phase, record.relative_path.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        collisions,
        vec![(InstallPhase::Common, PathBuf::from(".platform/routes.yaml"))]
    );

    Ok(())
}

#[test]
fn layered_install_reports_only_unexpected_overwrites() -> Result<()> {
    let fixture = SetupFixture::new()?;
    let common = fixture.resource("common", "4.6", "a.txt", "common a")?;
    let specific = fixture.resource("ibexa-oss", "4.6", "a.txt", "specific a")?;
    fixture.resource("ibexa-oss", "4.6", "b.txt", "specific b")?;
    fixture.project_file("a.txt", "user a")?;
    fixture.project_file("b.txt", "user b")?;

    let report = install_layered(
        &LocalFilesystem::new(),
        common.parent().unwrap(),
        specific.parent().unwrap(),
        fixture.project_dir(),
        &ProgressBar::hidden(),
    )?;

    let records = report
        .records()
        .iter()
        .map(|record| {
            (
                record.phase,
                record.relative_path.to_string_lossy().into_owned(),
                record.was_overwritten,
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        records,
        vec![
            (InstallPhase::Common, "a.txt".to_string(), true),
            (InstallPhase::Specific, "a.txt".to_string(), false),
            (InstallPhase::Specific, "b.txt".to_string(), true),
        ]
    );
    assert_eq!(fixture.read("a.txt")?, "specific a");
    assert_eq!(fixture.read("b.txt")?, "specific b");

    Ok(())
}

#[test]
fn plan_follows_branch_alias_of_dev_install() -> Result<()> {
    let fixture = SetupFixture::new()?;
    fixture.installed(indoc! {r#"
        {
            "packages": [
                {
                    "name": "ibexa/content",
                    "version": "dev-master",
                    "version_normalized": "dev-master",
                    "extra": { "branch-alias": { "dev-master": "4.6.x-dev" } }
                }
            ]
        }
    "#})?;
    fixture.version_dir("common", "4.5")?;
    fixture.version_dir("common", "4.6")?;
    fixture.version_dir("common", "5.0")?;
    fixture.version_dir("ibexa-content", "4.6")?;
    fixture.version_dir("ibexa-content", "dev-master")?;

    let product = ProductIdentity::resolve(&registry(&fixture)?)?;
    let plan = setup(&fixture).plan(&product)?;

    assert_eq!(plan.product.aliases(), ["4.6.x-dev".to_string()]);
    assert_eq!(plan.common_dir, fixture.resource_root().join("common/4.6"));
    assert_eq!(
        plan.specific_dir,
        fixture.resource_root().join("ibexa-content/dev-master")
    );

    Ok(())
}

#[test]
fn unmatched_version_aborts_before_copying() -> Result<()> {
    let fixture = SetupFixture::new()?;
    fixture.installed(EXPERIENCE_4_6)?;
    fixture.resource("common", "4.6", ".platform.app.yaml", "common 4.6")?;
    fixture.resource("ibexa-experience", "3.3", ".platform.app.yaml", "experience 3.3")?;

    let result = setup(&fixture).platform_sh(
        &registry(&fixture)?,
        fixture.project_dir(),
        &ProgressBar::hidden(),
    );

    assert!(matches!(
        result,
        Err(SetupError::Version(VersionError::NoMatchingVersionDirectory { product, .. }))
            if product == "ibexa/experience"
    ));
    assert!(!fixture.project_dir().join(".platform.app.yaml").exists());

    Ok(())
}

#[test]
fn missing_product_area_is_reported() -> Result<()> {
    let fixture = SetupFixture::new()?;
    fixture.installed(EXPERIENCE_4_6)?;
    fixture.version_dir("common", "4.6")?;

    let result = setup(&fixture).platform_sh(
        &registry(&fixture)?,
        fixture.project_dir(),
        &ProgressBar::hidden(),
    );

    let expect = fixture.resource_root().join("ibexa-experience");
    assert!(matches!(
        result,
        Err(SetupError::Version(VersionError::Filesystem(FsError::MissingDirectory { path })))
            if path == expect
    ));

    Ok(())
}

#[test]
fn missing_product_edition_is_reported() -> Result<()> {
    let fixture = SetupFixture::new()?;
    fixture.installed(r#"{ "packages": [{ "name": "symfony/console", "version": "v5.4.0" }] }"#)?;

    let result = setup(&fixture).platform_sh(
        &registry(&fixture)?,
        fixture.project_dir(),
        &ProgressBar::hidden(),
    );

    assert!(matches!(
        result,
        Err(SetupError::Product(ProductError::NoProductInstalled { .. }))
    ));

    Ok(())
}

#[test]
fn missing_resource_root_for_layered_install() -> Result<()> {
    let fixture = SetupFixture::new()?;
    let specific = fixture.resource("ibexa-oss", "4.6", "b.txt", "specific b")?;
    let missing = fixture.resource_root().join("common/4.6");

    let result = install_layered(
        &LocalFilesystem::new(),
        &missing,
        specific.parent().unwrap(),
        fixture.project_dir(),
        &ProgressBar::hidden(),
    );

    assert!(matches!(
        result,
        Err(SetupError::Resource(ResourceError::ResourceRootMissing { path })) if path == missing
    ));
    assert!(!fixture.project_dir().join("b.txt").exists());

    Ok(())
}
