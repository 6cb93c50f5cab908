use sl_core::json::{AssetIndex, Library, ProblemSeverity, VersionPatch};

/// The merged result of applying all components in list order.
///
/// Rebuilt from scratch on every structural change; construction is
/// deterministic given the component order and each component's version file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchProfile {
    libraries: Vec<Library>,
    jar_mods: Vec<Library>,
    main_jar: Option<Library>,
    game_arguments: Vec<String>,
    jvm_arguments: Vec<String>,
    asset_index: Option<AssetIndex>,
    problem_severity: ProblemSeverity,
}

impl LaunchProfile {
    /// Merges one patch into the profile. Order of operations: libraries,
    /// jar mods, main jar, arguments, asset index, problem severity.
    pub fn apply_patch(&mut self, patch: &VersionPatch) {
        for library in &patch.libraries {
            self.apply_library(library);
        }
        for jar_mod in &patch.jar_mods {
            self.jar_mods.push(jar_mod.clone());
        }
        if let Some(main_jar) = &patch.main_jar {
            self.main_jar = Some(main_jar.clone());
        }
        if let Some(arguments) = &patch.minecraft_arguments {
            self.game_arguments.push(arguments.clone());
        }
        self.jvm_arguments.extend(patch.jvm_args.iter().cloned());
        if let Some(asset_index) = &patch.asset_index {
            self.asset_index = Some(asset_index.clone());
        }
        self.apply_problem_severity(patch.problem_severity());
    }

    /// Libraries are deduplicated by specifier group:artifact; a later
    /// patch declaring the same artifact replaces the earlier entry in
    /// place, keeping its position in the load order.
    fn apply_library(&mut self, library: &Library) {
        if let Some(existing) = self
            .libraries
            .iter_mut()
            .find(|candidate| candidate.name.same_artifact(&library.name))
        {
            *existing = library.clone();
        } else {
            self.libraries.push(library.clone());
        }
    }

    /// Raises the aggregate severity; never lowers it.
    pub fn apply_problem_severity(&mut self, severity: ProblemSeverity) {
        if severity > self.problem_severity {
            self.problem_severity = severity;
        }
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    pub fn jar_mods(&self) -> &[Library] {
        &self.jar_mods
    }

    pub fn main_jar(&self) -> Option<&Library> {
        self.main_jar.as_ref()
    }

    pub fn game_arguments(&self) -> &[String] {
        &self.game_arguments
    }

    pub fn jvm_arguments(&self) -> &[String] {
        &self.jvm_arguments
    }

    pub fn asset_index(&self) -> Option<&AssetIndex> {
        self.asset_index.as_ref()
    }

    pub fn problem_severity(&self) -> ProblemSeverity {
        self.problem_severity
    }
}
