//! Compiled contract artifacts and the factories built from them.
//!
//! Artifacts are the JSON files emitted by the Solidity toolchain. Both the
//! Hardhat layout (`artifacts/<source>/<Name>.json` with a hex `bytecode`
//! string) and the Foundry layout (`out/<File>.sol/<Name>.json` with a
//! `bytecode.object` field) are understood.

use alloy::{
    json_abi::JsonAbi,
    primitives::{Bytes, hex},
};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

use crate::error::{ArtifactError, SubmissionError};

/// Directory holding per-compilation build info, never contract artifacts.
const BUILD_INFO_DIR: &str = "build-info";

/// A compiled contract that can produce creation code for a new instance.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    source: Option<String>,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractFactory {
    pub fn new(name: impl Into<String>, abi: JsonAbi, bytecode: Bytes) -> Self {
        Self {
            name: name.into(),
            source: None,
            abi,
            bytecode,
        }
    }

    /// Records the source unit the contract was compiled from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// `<source>:<name>` when the source unit is known, the bare name otherwise.
    pub fn fully_qualified_name(&self) -> String {
        match &self.source {
            Some(source) => format!("{source}:{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Number of arguments the constructor declares.
    pub fn constructor_inputs(&self) -> usize {
        self.abi
            .constructor
            .as_ref()
            .map_or(0, |constructor| constructor.inputs.len())
    }

    /// Creation code for a deployment without constructor arguments.
    pub fn deploy_code(&self) -> Result<Bytes, SubmissionError> {
        match self.constructor_inputs() {
            0 => Ok(self.bytecode.clone()),
            expected => Err(SubmissionError::ConstructorArguments { expected }),
        }
    }
}

/// Looks up compiled contracts by name inside an artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    root: PathBuf,
}

impl ArtifactRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `name` into a deployable factory.
    ///
    /// `name` is either a bare contract name (`HyperBlockLabs`) or a fully
    /// qualified one (`contracts/HyperBlockLabs.sol:HyperBlockLabs`). A bare
    /// name defined by more than one source unit is rejected as ambiguous.
    pub fn resolve(&self, name: &str) -> Result<ContractFactory, ArtifactError> {
        let (requested_source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };

        let mut found = Vec::new();
        self.collect(&self.root, contract, &mut found)?;

        // Symlinked artifact files may point at one already found.
        let mut seen = BTreeSet::new();
        found.retain(|path| {
            seen.insert(fs::canonicalize(path).unwrap_or_else(|_| path.clone()))
        });

        let mut matches = Vec::new();
        for path in found {
            let artifact = load_artifact(&path)?;
            let source = artifact.source_unit(&self.root, &path);
            if requested_source.is_none_or(|requested| source_matches(&source, requested)) {
                matches.push((path, source, artifact));
            }
        }

        let (path, source, artifact) = match matches.len() {
            0 => {
                return Err(ArtifactError::NotFound {
                    name: name.to_string(),
                    dir: self.root.clone(),
                });
            }
            1 => matches.remove(0),
            _ => {
                let mut candidates: Vec<_> = matches
                    .iter()
                    .map(|(_, source, _)| format!("{source}:{contract}"))
                    .collect();
                candidates.sort();
                return Err(ArtifactError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                });
            }
        };

        debug!(contract, %source, path = %path.display(), "resolved contract artifact");
        artifact.into_factory(contract, source, &path)
    }

    /// Recursively gathers every `<contract>.json` artifact under `dir`.
    fn collect(
        &self,
        dir: &Path,
        contract: &str,
        found: &mut Vec<PathBuf>,
    ) -> Result<(), ArtifactError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            // A missing artifacts directory just means nothing was compiled.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && dir == self.root => {
                return Ok(());
            }
            Err(source) => {
                return Err(ArtifactError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let file_name = format!("{contract}.json");
        for entry in entries {
            let entry = entry.map_err(|source| ArtifactError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|source| ArtifactError::Io {
                path: path.clone(),
                source,
            })?;

            if file_type.is_dir() {
                if entry.file_name() != BUILD_INFO_DIR {
                    self.collect(&path, contract, found)?;
                }
                continue;
            }

            // Symlinked directories are skipped, they may loop back into the root.
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }

            // `<Name>.dbg.json` debug companions never match `<Name>.json`.
            if entry.file_name() == file_name.as_str() {
                trace!(path = %path.display(), "found artifact candidate");
                found.push(path);
            }
        }

        Ok(())
    }
}

/// Whether a candidate's source unit satisfies the source part of a fully
/// qualified name. Foundry only records the file name of the source unit.
fn source_matches(candidate: &str, requested: &str) -> bool {
    if candidate == requested {
        return true;
    }
    !candidate.contains('/')
        && Path::new(requested)
            .file_name()
            .is_some_and(|file| file == candidate)
}

fn load_artifact(path: &Path) -> Result<RawArtifact, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

type LinkReferences = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    source_name: Option<String>,
    #[serde(default)]
    abi: JsonAbi,
    bytecode: RawBytecode,
    #[serde(default)]
    link_references: LinkReferences,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat: the creation code as a plain hex string.
    Hex(String),
    /// Foundry: the creation code nested with its link references.
    Object {
        object: String,
        #[serde(default, rename = "linkReferences")]
        link_references: LinkReferences,
    },
}

impl RawArtifact {
    /// Source unit of the artifact: the recorded `sourceName` when present,
    /// otherwise the artifact's directory relative to the registry root.
    fn source_unit(&self, root: &Path, path: &Path) -> String {
        if let Some(source) = &self.source_name {
            return source.clone();
        }
        path.parent()
            .and_then(|parent| parent.strip_prefix(root).ok())
            .map(|relative| {
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }

    fn into_factory(
        self,
        contract: &str,
        source: String,
        path: &Path,
    ) -> Result<ContractFactory, ArtifactError> {
        let (code, mut links) = match self.bytecode {
            RawBytecode::Hex(code) => (code, self.link_references),
            RawBytecode::Object {
                object,
                link_references,
            } => (object, link_references),
        };

        // Unlinked library slots are `__$<hash>$__` placeholders in the hex.
        if links.is_empty() && code.contains("__") {
            links.insert(String::from("<unknown>"), BTreeMap::new());
        }
        if !links.is_empty() {
            let libraries = links
                .into_iter()
                .flat_map(|(file, libs)| {
                    if libs.is_empty() {
                        vec![file]
                    } else {
                        libs.into_keys().map(|lib| format!("{file}:{lib}")).collect()
                    }
                })
                .collect();
            return Err(ArtifactError::UnlinkedLibraries {
                name: contract.to_string(),
                libraries,
            });
        }

        let bytecode = hex::decode(code.trim()).map_err(|source| ArtifactError::InvalidBytecode {
            path: path.to_path_buf(),
            source,
        })?;
        if bytecode.is_empty() {
            return Err(ArtifactError::Abstract {
                name: contract.to_string(),
            });
        }

        let mut factory = ContractFactory::new(contract, self.abi, bytecode.into());
        if !source.is_empty() {
            factory = factory.with_source(source);
        }
        Ok(factory)
    }
}
