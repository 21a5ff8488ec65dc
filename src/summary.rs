use std::fmt::Write;

use bon::Builder;
use buildpush_process_management::drivers::types::{BuildOutput, CiContext};
use indexmap::IndexMap;

use crate::target::ResolvedTarget;

/// A markdown report of a run for the CI job summary.
#[derive(Debug, Clone, Copy, Builder)]
pub struct Summary<'scope> {
    targets: &'scope [ResolvedTarget],

    labels: &'scope IndexMap<String, String>,

    ctx: &'scope CiContext,

    /// The build engine output, unset when nothing was built.
    output: Option<&'scope BuildOutput>,

    #[builder(default)]
    push: bool,

    #[builder(default)]
    load: bool,
}

impl Summary<'_> {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("### Build summary\n\n");

        let git_ref = self.ctx.git_ref.as_ref().map(|git_ref| git_ref.name());
        let rows = [
            ("Commit", self.ctx.sha.as_deref()),
            ("Ref", git_ref.as_deref()),
            ("Pushed", Some(yes_no(self.push))),
            ("Loaded", Some(yes_no(self.load))),
        ];
        md.push_str("| | |\n|---|---|\n");
        for (name, value) in rows {
            if let Some(value) = value {
                let _ = writeln!(md, "| {name} | `{value}` |");
            }
        }

        md.push_str("\n| Image | Tag |\n|---|---|\n");
        for target in self.targets {
            let _ = writeln!(md, "| `{}` | `{}` |", target.repository, target.tag);
        }

        match self.output {
            Some(output) => {
                md.push('\n');
                if !output.image_id.is_empty() {
                    let _ = writeln!(md, "**Image ID:** `{}`  ", output.image_id);
                }
                if !output.digest.is_empty() {
                    let _ = writeln!(md, "**Digest:** `{}`  ", output.digest);
                }
            }
            None => md.push_str("\n_Dry run, nothing was built._\n"),
        }

        if !self.labels.is_empty() {
            md.push_str("\n<details><summary>Labels</summary>\n\n| Key | Value |\n|---|---|\n");
            for (key, value) in self.labels {
                let _ = writeln!(md, "| `{key}` | `{}` |", value.replace('|', "\\|"));
            }
            md.push_str("\n</details>\n");
        }

        md
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
