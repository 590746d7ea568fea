//! Built-in catalog of dependency presets.
//!
//! Each preset is a complete, named [`DependencyDescriptor`] for a library
//! the tool knows how to acquire and build. Divergent flag sets for the
//! same library are distinct presets (`sqlite3` vs `sqlite3-lite`), never
//! silent per-project duplication; project-level deviations are expressed
//! as explicit overrides in the manifest.
//!
//! URL templates may contain `{version}`, substituted when the descriptor
//! is instantiated, so a manifest can pin a different version without
//! re-declaring every mirror.

use std::path::PathBuf;

use crate::core::descriptor::{ArchiveFormat, BuildFlag, BuildKind, DependencyDescriptor};

/// A catalog entry: identifier, one-line summary, descriptor factory.
pub struct Preset {
    /// Preset identifier, referenced by `preset = "..."` in the manifest.
    pub id: &'static str,
    /// One-line human description.
    pub summary: &'static str,
    build: fn() -> DependencyDescriptor,
}

impl Preset {
    /// Instantiate the preset's descriptor with `{version}` templates
    /// rendered.
    pub fn descriptor(&self) -> DependencyDescriptor {
        render((self.build)())
    }

    /// Instantiate with a version override; URL templates re-render.
    pub fn descriptor_with_version(&self, version: &str) -> DependencyDescriptor {
        let mut d = (self.build)();
        d.version = version.to_string();
        // A pinned checksum only covers the preset's own version.
        d.sha256 = None;
        render(d)
    }
}

/// Substitute `{version}` in every URL template.
fn render(mut d: DependencyDescriptor) -> DependencyDescriptor {
    let version = d.version.clone();
    for url in &mut d.source_urls {
        *url = url.replace("{version}", &version);
    }
    d
}

/// Look up a preset by identifier.
pub fn preset(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// All presets, in catalog order.
pub fn all() -> &'static [Preset] {
    PRESETS
}

fn gmp() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("gmp", "6.3.0", BuildKind::Autotools);
    d.source_urls = vec![
        "https://gmplib.org/download/gmp/gmp-{version}.tar.xz".to_string(),
        "https://ftp.gnu.org/gnu/gmp/gmp-{version}.tar.xz".to_string(),
        "https://ftpmirror.gnu.org/gmp/gmp-{version}.tar.xz".to_string(),
    ];
    d.archive_format = ArchiveFormat::TarXz;
    d.build_flags = vec![
        BuildFlag::switch("--disable-shared"),
        BuildFlag::switch("--enable-static"),
        BuildFlag::switch("--enable-cxx"),
        BuildFlag::switch("--with-pic"),
    ];
    // C++ wrapper must precede the C base library on the link line.
    d.link_targets = vec!["gmpxx".to_string(), "gmp".to_string()];
    d
}

fn gsl() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("gsl", "2.8", BuildKind::Autotools);
    d.source_urls = vec![
        "https://ftp.gnu.org/gnu/gsl/gsl-{version}.tar.gz".to_string(),
        "https://ftpmirror.gnu.org/gsl/gsl-{version}.tar.gz".to_string(),
    ];
    d.archive_format = ArchiveFormat::TarGz;
    d.build_flags = vec![
        BuildFlag::switch("--disable-shared"),
        BuildFlag::switch("--enable-static"),
        BuildFlag::switch("--with-pic"),
    ];
    d.link_targets = vec!["gsl".to_string(), "gslcblas".to_string()];
    d
}

fn botan() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("botan", "3.5.0", BuildKind::PythonConfigure);
    d.source_urls = vec![
        "https://botan.randombit.net/releases/Botan-{version}.tar.xz".to_string(),
        "https://github.com/randombit/botan/archive/refs/tags/{version}.tar.gz".to_string(),
    ];
    d.archive_format = ArchiveFormat::TarXz;
    // Minimized build with an explicitly enumerated module list keeps the
    // library small and the configure step deterministic.
    d.build_flags = vec![
        BuildFlag::switch("--minimized-build"),
        BuildFlag::with_value(
            "--enable-modules",
            "aes,sha2_32,sha2_64,hmac,kdf2,auto_rng,system_rng",
        ),
        BuildFlag::switch("--disable-shared"),
        BuildFlag::switch("--without-documentation"),
    ];
    d.link_targets = vec!["botan-3".to_string()];
    d
}

fn duckdb() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("duckdb", "1.2.1", BuildKind::CMake);
    d.source_urls =
        vec!["https://github.com/duckdb/duckdb/archive/refs/tags/v{version}.tar.gz".to_string()];
    d.archive_format = ArchiveFormat::TarGz;
    d.build_flags = vec![
        BuildFlag::with_value("BUILD_SHARED_LIBS", "OFF"),
        BuildFlag::with_value("BUILD_UNITTESTS", "OFF"),
        BuildFlag::with_value("BUILD_SHELL", "OFF"),
        BuildFlag::with_value("ENABLE_EXTENSION_AUTOLOADING", "OFF"),
    ];
    d.link_targets = vec!["duckdb_static".to_string()];
    d
}

fn libsodium() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("libsodium", "1.0.20", BuildKind::Autotools);
    d.source_urls = vec![
        "https://download.libsodium.org/libsodium/releases/libsodium-{version}.tar.gz".to_string(),
        "https://github.com/jedisct1/libsodium/releases/download/{version}-RELEASE/libsodium-{version}.tar.gz"
            .to_string(),
    ];
    d.archive_format = ArchiveFormat::TarGz;
    d.build_flags = vec![
        BuildFlag::switch("--disable-shared"),
        BuildFlag::switch("--enable-static"),
        BuildFlag::switch("--with-pic"),
    ];
    d.link_targets = vec!["sodium".to_string()];
    d
}

fn alglib() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("alglib", "4.02.0", BuildKind::ManualCompile);
    d.source_urls =
        vec!["https://www.alglib.net/translator/re/alglib-{version}.cpp.gpl.tgz".to_string()];
    d.archive_format = ArchiveFormat::TarGz;
    // Ships bare .cpp files with no build system of any kind.
    d.build_flags = vec![
        BuildFlag::switch("-O2"),
        BuildFlag::switch("-fPIC"),
        BuildFlag::with_value("-DAE_CPU", "AE_INTEL"),
    ];
    d.source_marker = Some("src/ap.h".to_string());
    d.link_targets = vec!["alglib".to_string()];
    d
}

fn openblas() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("openblas", "0.3.27", BuildKind::MakeDirect);
    d.source_urls = vec![
        "https://github.com/OpenMathLib/OpenBLAS/releases/download/v{version}/OpenBLAS-{version}.tar.gz"
            .to_string(),
        "https://github.com/OpenMathLib/OpenBLAS/archive/refs/tags/v{version}.tar.gz".to_string(),
    ];
    d.archive_format = ArchiveFormat::TarGz;
    d.build_flags = vec![
        BuildFlag::with_value("NO_SHARED", "1"),
        BuildFlag::with_value("USE_THREAD", "0"),
        BuildFlag::with_value("NO_LAPACK", "0"),
    ];
    d.link_targets = vec!["openblas".to_string()];
    d
}

fn sqlite3() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("sqlite3", "3460000", BuildKind::ManualCompile);
    d.source_urls =
        vec!["https://www.sqlite.org/2024/sqlite-amalgamation-{version}.zip".to_string()];
    d.archive_format = ArchiveFormat::Zip;
    d.build_flags = vec![
        BuildFlag::switch("-O2"),
        BuildFlag::switch("-fPIC"),
        BuildFlag::switch("-DSQLITE_ENABLE_FTS5"),
        BuildFlag::switch("-DSQLITE_ENABLE_RTREE"),
        BuildFlag::with_value("-DSQLITE_THREADSAFE", "1"),
    ];
    d.source_marker = Some("sqlite3.c".to_string());
    d.link_targets = vec!["sqlite3".to_string()];
    d
}

fn sqlite3_lite() -> DependencyDescriptor {
    let mut d = sqlite3();
    d.build_flags = vec![
        BuildFlag::switch("-Os"),
        BuildFlag::switch("-fPIC"),
        BuildFlag::switch("-DSQLITE_OMIT_LOAD_EXTENSION"),
        BuildFlag::switch("-DSQLITE_OMIT_DEPRECATED"),
        BuildFlag::with_value("-DSQLITE_THREADSAFE", "0"),
    ];
    d
}

fn eigen() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("eigen", "3.4.0", BuildKind::HeaderOnly);
    d.source_urls = vec![
        "https://gitlab.com/libeigen/eigen/-/archive/{version}/eigen-{version}.tar.gz".to_string(),
    ];
    d.archive_format = ArchiveFormat::TarGz;
    d.source_marker = Some("Eigen/Core".to_string());
    d.expected_artifacts = vec![PathBuf::from("include/Eigen/Core")];
    d
}

fn doctest() -> DependencyDescriptor {
    let mut d = DependencyDescriptor::new("doctest", "2.4.11", BuildKind::HeaderOnly);
    d.source_urls = vec![
        "https://raw.githubusercontent.com/doctest/doctest/v{version}/doctest/doctest.h"
            .to_string(),
    ];
    d.archive_format = ArchiveFormat::Plain;
    d.source_marker = Some("doctest.h".to_string());
    d.expected_artifacts = vec![PathBuf::from("include/doctest.h")];
    d
}

static PRESETS: &[Preset] = &[
    Preset {
        id: "gmp",
        summary: "GNU multiple precision arithmetic (with C++ bindings)",
        build: gmp,
    },
    Preset {
        id: "gsl",
        summary: "GNU scientific library",
        build: gsl,
    },
    Preset {
        id: "botan",
        summary: "Botan crypto library, minimized module set",
        build: botan,
    },
    Preset {
        id: "duckdb",
        summary: "DuckDB analytical database, static library",
        build: duckdb,
    },
    Preset {
        id: "libsodium",
        summary: "libsodium crypto primitives",
        build: libsodium,
    },
    Preset {
        id: "alglib",
        summary: "ALGLIB numerical analysis (no upstream build system)",
        build: alglib,
    },
    Preset {
        id: "openblas",
        summary: "OpenBLAS linear algebra kernels",
        build: openblas,
    },
    Preset {
        id: "sqlite3",
        summary: "SQLite amalgamation with FTS5 and R*Tree",
        build: sqlite3,
    },
    Preset {
        id: "sqlite3-lite",
        summary: "SQLite amalgamation, size-optimized single-thread variant",
        build: sqlite3_lite,
    },
    Preset {
        id: "eigen",
        summary: "Eigen linear algebra templates (header-only)",
        build: eigen,
    },
    Preset {
        id: "doctest",
        summary: "doctest testing framework (single header)",
        build: doctest,
    },
];
