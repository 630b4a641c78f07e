//! Shared test infrastructure: temp contexts and a builder that writes
//! real `.deb` archives (ar container, gzip-compressed tar members).

#![allow(dead_code)] // Test utilities may not all be used in every test file

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use runepkg_lib::config::Settings;
use runepkg_lib::core::Context;

/// A fully wired temp environment: database root, scratch root, target
/// root, and a `debs/` directory for fixtures.
pub struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(tmp.path().join("debs")).unwrap();
        Self { tmp }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            runepkg_dir: self.tmp.path().to_path_buf(),
            control_dir: self.tmp.path().join("control"),
            runepkg_db: self.tmp.path().join("db"),
            install_dir: self.tmp.path().join("root"),
        }
    }

    pub fn context(&self, force: bool) -> Context {
        Context::open(self.settings(), force, false).expect("context")
    }

    pub fn db_root(&self) -> PathBuf {
        self.tmp.path().join("db")
    }

    pub fn install_root(&self) -> PathBuf {
        self.tmp.path().join("root")
    }

    pub fn debs_dir(&self) -> PathBuf {
        self.tmp.path().join("debs")
    }

    /// Write a config file for CLI invocations and return its path.
    pub fn write_config(&self) -> PathBuf {
        let path = self.tmp.path().join("runepkgconfig");
        let content = format!(
            "runepkg_dir = {}\ncontrol_dir = {}\nrunepkg_db = {}\ninstall_dir = {}\n",
            self.tmp.path().display(),
            self.tmp.path().join("control").display(),
            self.db_root().display(),
            self.install_root().display(),
        );
        std::fs::write(&path, content).unwrap();
        path
    }
}

enum PayloadEntry {
    File {
        path: String,
        content: Vec<u8>,
        mode: u32,
    },
    Symlink {
        path: String,
        target: String,
    },
}

/// Builds a `.deb` the way dpkg-deb lays one out: a `debian-binary`
/// member, `control.tar.gz`, and `data.tar.gz` inside an ar container.
pub struct DebBuilder {
    name: String,
    version: String,
    arch: String,
    depends: Option<String>,
    description: Option<String>,
    entries: Vec<PayloadEntry>,
}

impl DebBuilder {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            arch: "all".to_string(),
            depends: None,
            description: None,
            entries: Vec::new(),
        }
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    pub fn depends(mut self, depends: &str) -> Self {
        self.depends = Some(depends.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn file(mut self, path: &str, content: &[u8], mode: u32) -> Self {
        self.entries.push(PayloadEntry::File {
            path: path.to_string(),
            content: content.to_vec(),
            mode,
        });
        self
    }

    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.entries.push(PayloadEntry::Symlink {
            path: path.to_string(),
            target: target.to_string(),
        });
        self
    }

    /// Conventional `{name}_{version}_{arch}.deb` filename.
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.deb", self.name, self.version, self.arch)
    }

    /// Write the archive into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let control_tar = self.control_tar_gz();
        let data_tar = self.data_tar_gz();

        let deb_path = dir.join(self.file_name());
        let mut builder = ar::Builder::new(File::create(&deb_path).unwrap());

        append_ar_member(&mut builder, "debian-binary", b"2.0\n");
        append_ar_member(&mut builder, "control.tar.gz", &control_tar);
        append_ar_member(&mut builder, "data.tar.gz", &data_tar);
        builder.into_inner().unwrap().flush().unwrap();

        deb_path
    }

    fn control_content(&self) -> String {
        let mut control = format!(
            "Package: {}\nVersion: {}\nArchitecture: {}\n",
            self.name, self.version, self.arch
        );
        if let Some(depends) = &self.depends {
            control.push_str(&format!("Depends: {depends}\n"));
        }
        let description = self.description.as_deref().unwrap_or("test fixture");
        control.push_str(&format!("Description: {description}\n"));
        control
    }

    fn control_tar_gz(&self) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut tar = tar::Builder::new(encoder);

        let control = self.control_content();
        let mut header = tar::Header::new_gnu();
        header.set_size(control.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, "control", control.as_bytes())
            .unwrap();

        tar.into_inner().unwrap().finish().unwrap()
    }

    fn data_tar_gz(&self) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut tar = tar::Builder::new(encoder);

        for entry in &self.entries {
            match entry {
                PayloadEntry::File {
                    path,
                    content,
                    mode,
                } => {
                    let mut header = tar::Header::new_gnu();
                    header.set_size(content.len() as u64);
                    header.set_mode(*mode);
                    header.set_cksum();
                    tar.append_data(&mut header, path, content.as_slice())
                        .unwrap();
                }
                PayloadEntry::Symlink { path, target } => {
                    let mut header = tar::Header::new_gnu();
                    header.set_entry_type(tar::EntryType::Symlink);
                    header.set_size(0);
                    header.set_mode(0o777);
                    tar.append_link(&mut header, path, target).unwrap();
                }
            }
        }

        tar.into_inner().unwrap().finish().unwrap()
    }
}

fn append_ar_member<W: std::io::Write>(builder: &mut ar::Builder<W>, name: &str, data: &[u8]) {
    let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
    builder.append(&header, data).unwrap();
}
