//! Interactive command loop over an [`AppContext`].
//!
//! Reads one command per line. Commands that need more input prompt for it,
//! showing the current or default value in brackets; an empty answer keeps
//! it. Core errors are printed and the loop continues.

use std::io::{self, BufRead, Write};

use civil_core::calculations::bending::{calculate, BendingInput, RebarLayout};
use civil_core::forms::{MaterialForm, SectionForm};
use civil_core::materials::{standard_class_codes, Material, MaterialType, CUSTOM_CLASS};
use civil_core::sections::GeometryType;
use civil_core::settings::Theme;
use civil_core::validation::parse_number;
use civil_core::{AppContext, CoreError, EntityKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("input closed")]
    Eof,
}

type CliResult<T> = Result<T, CliError>;

/// What the loop does after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
Commands:
  profiles                      List profiles (* = active)
  profile new [name]            Create a profile and switch to it
  profile use [name]            Switch the active profile
  profile rename [name]         Rename a profile
  profile delete [name]         Delete a profile
  info                          Show project info of the active profile
  info set <field> <value>      Set desc, engineer, concrete_reg, seismic_reg, load_reg or units
  materials                     List materials
  material add|edit|delete      Manage materials
  sections                      List sections
  section add|edit|delete       Manage sections
  bending                       Bending capacity check of a rectangular section
  theme [dark|light|system]     Show or set the theme
  quit                          Save settings and exit";

/// Split off the first word
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

fn props_label(material: &Material) -> String {
    match (material.fck(), material.fyk(), material.es()) {
        (Some(fck), _, _) => format!("fck = {} MPa", fck),
        (_, Some(fyk), Some(es)) => format!("fyk = {} MPa, Es = {} MPa", fyk, es),
        _ => String::new(),
    }
}

pub struct Session<R, W> {
    app: AppContext,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(app: AppContext, input: R, out: W) -> Self {
        Session { app, input, out }
    }

    #[cfg(test)]
    fn into_parts(self) -> (AppContext, W) {
        (self.app, self.out)
    }

    /// Run until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        self.banner()?;
        loop {
            write!(self.out, "{}> ", self.app.store().active_name())?;
            self.out.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => break,
            };
            match self.execute(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(CliError::Core(e)) => writeln!(self.out, "Error: {}", e)?,
                Err(CliError::Io(e)) => return Err(e),
                Err(CliError::Eof) => break,
            }
        }

        if let Err(e) = self.app.save_settings() {
            log::warn!("Settings not saved: {}", e);
        }
        writeln!(self.out, "Bye.")?;
        Ok(())
    }

    fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "Civilkit CLI - Profiles, Materials and Section Checks")?;
        writeln!(self.out, "=====================================================")?;
        writeln!(self.out, "Data directory: {}", self.app.data_dir().display())?;
        if let Some(info) = self.app.locked_by() {
            writeln!(
                self.out,
                "READ-ONLY: profiles are locked by {} since {}. Changes will not be saved.",
                info.holder(),
                info.locked_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        writeln!(self.out, "Type 'help' for commands.")?;
        writeln!(self.out)
    }

    /// Execute one command line.
    pub fn execute(&mut self, line: &str) -> CliResult<Flow> {
        let (command, rest) = split_word(line);
        match command {
            "" => {}
            "help" | "?" => writeln!(self.out, "{}", HELP)?,
            "profiles" => self.list_profiles()?,
            "profile" => self.profile_command(rest)?,
            "info" => self.info_command(rest)?,
            "materials" => self.list_materials()?,
            "material" => self.material_command(rest)?,
            "sections" => self.list_sections()?,
            "section" => self.section_command(rest)?,
            "bending" => self.bending()?,
            "theme" => self.theme(rest)?,
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => writeln!(self.out, "Unknown command '{}'. Type 'help'.", other)?,
        }
        Ok(Flow::Continue)
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn ask(&mut self, label: &str) -> CliResult<String> {
        self.ask_default(label, "")
    }

    fn ask_default(&mut self, label: &str, default: &str) -> CliResult<String> {
        if default.is_empty() {
            write!(self.out, "{}: ", label)?;
        } else {
            write!(self.out, "{} [{}]: ", label, default)?;
        }
        self.out.flush()?;

        let answer = self.read_line()?.ok_or(CliError::Eof)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    fn ask_number(&mut self, label: &str, field: &str, default: f64) -> CliResult<f64> {
        let text = self.ask_default(label, &default.to_string())?;
        Ok(parse_number(field, &text)?)
    }

    fn confirm(&mut self, question: &str) -> CliResult<bool> {
        let answer = self.ask(&format!("{} [y/N]", question))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes" | "e" | "evet"))
    }

    fn arg_or_ask(&mut self, arg: &str, label: &str, default: &str) -> CliResult<String> {
        if arg.is_empty() {
            self.ask_default(label, default)
        } else {
            Ok(arg.to_string())
        }
    }

    /// Save profiles and say so
    fn persist(&mut self, message: String) -> CliResult<()> {
        self.app.save_profiles()?;
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    fn list_profiles(&mut self) -> CliResult<()> {
        let store = self.app.store();
        for name in store.list_names() {
            let marker = if name == store.active_name() { "*" } else { " " };
            writeln!(self.out, "{} {}", marker, name)?;
        }
        Ok(())
    }

    fn profile_command(&mut self, rest: &str) -> CliResult<()> {
        let (sub, arg) = split_word(rest);
        let active = self.app.store().active_name().to_string();
        match sub {
            "new" => {
                let name = self.arg_or_ask(arg, "Profile name", "")?;
                let name = self.app.create_profile(&name)?;
                writeln!(self.out, "Profile '{}' created and selected.", name)?;
            }
            "use" => {
                let name = self.arg_or_ask(arg, "Profile", &active)?;
                self.app.select_profile(&name)?;
                writeln!(self.out, "Active profile: '{}'", name)?;
            }
            "rename" => {
                let old = self.arg_or_ask(arg, "Profile to rename", &active)?;
                if !self.app.store().contains(&old) {
                    return Err(CoreError::not_found(EntityKind::Profile, old).into());
                }
                let new = self.ask_default("New name", &old)?;
                self.app.rename_profile(&old, &new)?;
                writeln!(self.out, "Profile '{}' renamed to '{}'.", old, new.trim())?;
            }
            "delete" => {
                let name = self.arg_or_ask(arg, "Profile to delete", &active)?;
                if !self.app.store().contains(&name) {
                    return Err(CoreError::not_found(EntityKind::Profile, name).into());
                }
                if !self.confirm(&format!("Delete profile '{}' and all its data?", name))? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                let outcome = self.app.delete_profile(&name)?;
                writeln!(self.out, "Profile '{}' deleted.", outcome.deleted)?;
                if outcome.active_changed {
                    writeln!(self.out, "Active profile is now '{}'.", outcome.active)?;
                }
            }
            _ => writeln!(self.out, "Usage: profile new|use|rename|delete [name]")?,
        }
        Ok(())
    }

    fn info_command(&mut self, rest: &str) -> CliResult<()> {
        let (sub, arg) = split_word(rest);
        match sub {
            "" => {
                let profile = self.app.store().active();
                let info = &profile.project_info;
                writeln!(self.out, "Project:      {}", info.name)?;
                writeln!(self.out, "Description:  {}", info.description)?;
                writeln!(self.out, "Engineer:     {}", info.engineer)?;
                writeln!(self.out, "Concrete:     {}", info.concrete_code)?;
                writeln!(self.out, "Seismic:      {}", info.seismic_code)?;
                writeln!(self.out, "Loads:        {}", info.load_code)?;
                writeln!(self.out, "Units:        {}", info.units)?;
                writeln!(
                    self.out,
                    "Contents:     {} material(s), {} section(s)",
                    profile.materials.len(),
                    profile.sections.len()
                )?;
            }
            "set" => {
                let (field, value) = split_word(arg);
                let field = self.arg_or_ask(field, "Field", "")?;
                let value = self.arg_or_ask(value, "Value", "")?;
                let info = &mut self.app.store_mut().active_mut().project_info;
                if !info.set_field(&field, value) {
                    return Err(CoreError::invalid_input(
                        "field",
                        field,
                        "Expected desc, engineer, concrete_reg, seismic_reg, load_reg or units",
                    )
                    .into());
                }
                self.persist(format!("Project info '{}' updated.", field))?;
            }
            _ => writeln!(self.out, "Usage: info [set <field> <value>]")?,
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Materials
    // ------------------------------------------------------------------

    fn list_materials(&mut self) -> CliResult<()> {
        let materials = &self.app.store().active().materials;
        if materials.is_empty() {
            writeln!(self.out, "No materials in this profile.")?;
            return Ok(());
        }
        for name in materials.names_sorted() {
            if let Some(material) = materials.get(name) {
                writeln!(self.out, "  {:<40} {}", material.display_name(), props_label(material))?;
            }
        }
        Ok(())
    }

    fn material_command(&mut self, rest: &str) -> CliResult<()> {
        let (sub, arg) = split_word(rest);
        match sub {
            "add" => {
                let type_text = self.ask_default("Type (concrete/rebar)", "concrete")?;
                let mut form = MaterialForm::new(MaterialType::from_str_flexible(&type_text)?);
                form.user_name = self.arg_or_ask(arg, "Name", "")?;
                self.fill_material_form(&mut form)?;

                let material = form.to_material()?;
                let name = material.user_name.trim().to_string();
                self.app
                    .store_mut()
                    .active_mut()
                    .save_material(material, None)?;
                self.persist(format!("Material '{}' added.", name))?;
            }
            "edit" => {
                let original = self.arg_or_ask(arg, "Material to edit", "")?;
                let material = self
                    .app
                    .store()
                    .active()
                    .materials
                    .get(&original)
                    .cloned()
                    .ok_or_else(|| CoreError::not_found(EntityKind::Material, &original))?;

                let mut form = MaterialForm::from_material(&material);
                form.user_name = self.ask_default("Name", &form.user_name)?;
                self.fill_material_form(&mut form)?;

                let material = form.to_material()?;
                let name = material.user_name.trim().to_string();
                self.app
                    .store_mut()
                    .active_mut()
                    .save_material(material, Some(&original))?;
                self.persist(format!("Material '{}' updated.", name))?;
            }
            "delete" => {
                let name = self.arg_or_ask(arg, "Material to delete", "")?;
                if !self.app.store().active().materials.contains(&name) {
                    return Err(CoreError::not_found(EntityKind::Material, name).into());
                }
                if !self.confirm(&format!("Delete material '{}'?", name))? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                self.app.store_mut().active_mut().delete_material(&name)?;
                self.persist(format!("Material '{}' deleted.", name))?;
            }
            _ => writeln!(self.out, "Usage: material add|edit|delete [name]")?,
        }
        Ok(())
    }

    fn fill_material_form(&mut self, form: &mut MaterialForm) -> CliResult<()> {
        let mut classes = standard_class_codes(form.material_type);
        classes.push(CUSTOM_CLASS);
        writeln!(self.out, "Classes: {}", classes.join(", "))?;
        form.class_name = self.ask_default("Class", &form.class_name)?;

        if form.is_custom() {
            match form.material_type {
                MaterialType::Concrete => {
                    form.fck = self.ask_default("fck (MPa)", &form.fck)?;
                }
                MaterialType::RebarSteel => {
                    form.fyk = self.ask_default("fyk (MPa)", &form.fyk)?;
                    let es = if form.es.is_empty() { "200000".to_string() } else { form.es.clone() };
                    form.es = self.ask_default("Es (MPa)", &es)?;
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    fn list_sections(&mut self) -> CliResult<()> {
        let profile = self.app.store().active();
        if profile.sections.is_empty() {
            writeln!(self.out, "No sections in this profile.")?;
            return Ok(());
        }
        for section in profile.sections.sorted() {
            let props = section.properties();
            let material_flag = if profile.materials.resolve_concrete(&section.material_name).is_some() {
                ""
            } else {
                " (missing!)"
            };
            writeln!(
                self.out,
                "  {:<36} {}{}, cover {} mm, A = {:.0} mm²",
                section.display_name(),
                section.material_name,
                material_flag,
                section.cover_mm,
                props.area_mm2
            )?;
        }
        Ok(())
    }

    fn section_command(&mut self, rest: &str) -> CliResult<()> {
        let (sub, arg) = split_word(rest);
        match sub {
            "add" => {
                let kind = self.ask_default("Geometry (rectangular/circular)", "rectangular")?;
                let mut form = SectionForm::new(GeometryType::from_str_flexible(&kind)?);
                form.user_name = self.arg_or_ask(arg, "Name", "")?;
                self.fill_section_form(&mut form)?;

                let section = form.to_section()?;
                let name = section.user_name.trim().to_string();
                self.app
                    .store_mut()
                    .active_mut()
                    .save_section(section, None)?;
                self.persist(format!("Section '{}' added.", name))?;
            }
            "edit" => {
                let original = self.arg_or_ask(arg, "Section to edit", "")?;
                let section = self
                    .app
                    .store()
                    .active()
                    .sections
                    .get(&original)
                    .cloned()
                    .ok_or_else(|| CoreError::not_found(EntityKind::Section, &original))?;

                let mut form = SectionForm::from_section(&section);
                form.user_name = self.ask_default("Name", &form.user_name)?;
                let kind = self.ask_default(
                    "Geometry (rectangular/circular)",
                    form.geometry_type.display_name(),
                )?;
                form.geometry_type = GeometryType::from_str_flexible(&kind)?;
                self.fill_section_form(&mut form)?;

                let section = form.to_section()?;
                let name = section.user_name.trim().to_string();
                self.app
                    .store_mut()
                    .active_mut()
                    .save_section(section, Some(&original))?;
                self.persist(format!("Section '{}' updated.", name))?;
            }
            "delete" => {
                let name = self.arg_or_ask(arg, "Section to delete", "")?;
                if !self.app.store().active().sections.contains(&name) {
                    return Err(CoreError::not_found(EntityKind::Section, name).into());
                }
                if !self.confirm(&format!("Delete section '{}'?", name))? {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(());
                }
                self.app.store_mut().active_mut().delete_section(&name)?;
                self.persist(format!("Section '{}' deleted.", name))?;
            }
            _ => writeln!(self.out, "Usage: section add|edit|delete [name]")?,
        }
        Ok(())
    }

    fn fill_section_form(&mut self, form: &mut SectionForm) -> CliResult<()> {
        match form.geometry_type {
            GeometryType::Rectangular => {
                form.b = self.ask_default("b (mm)", &form.b)?;
                form.h = self.ask_default("h (mm)", &form.h)?;
            }
            GeometryType::Circular => {
                form.d = self.ask_default("D (mm)", &form.d)?;
            }
        }

        let concretes: Vec<String> = self
            .app
            .store()
            .active()
            .materials
            .concrete()
            .map(|m| m.user_name.clone())
            .collect();
        if concretes.is_empty() {
            writeln!(self.out, "No concrete materials yet; add one with 'material add'.")?;
        } else {
            writeln!(self.out, "Concrete materials: {}", concretes.join(", "))?;
        }
        let default_material = if form.material_name.is_empty() {
            concretes.first().cloned().unwrap_or_default()
        } else {
            form.material_name.clone()
        };
        form.material_name = self.ask_default("Concrete material", &default_material)?;
        form.cover_mm = self.ask_default("Cover (mm)", &form.cover_mm)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Calculations and settings
    // ------------------------------------------------------------------

    fn bending(&mut self) -> CliResult<()> {
        let profile = self.app.store().active();
        let sections: Vec<String> = profile
            .sections
            .list_rectangular()
            .iter()
            .map(|s| s.user_name.clone())
            .collect();
        let rebars: Vec<String> = profile
            .materials
            .rebar()
            .map(|m| m.user_name.clone())
            .collect();

        if sections.is_empty() {
            writeln!(self.out, "No rectangular sections in this profile.")?;
            return Ok(());
        }
        if rebars.is_empty() {
            writeln!(self.out, "No rebar materials in this profile.")?;
            return Ok(());
        }

        writeln!(self.out, "Sections: {}", sections.join(", "))?;
        let section = self.ask_default("Section", &sections[0])?;
        writeln!(self.out, "Rebar materials: {}", rebars.join(", "))?;
        let rebar = self.ask_default("Rebar material", &rebars[0])?;

        let count_text = self.ask_default("Tension bar count", "3")?;
        let count: u32 = count_text
            .parse()
            .map_err(|_| CoreError::invalid_number("bar_count", &count_text))?;
        let diameter = self.ask_number("Bar diameter (mm)", "bar_diameter_mm", 16.0)?;
        let stirrup = self.ask_number("Stirrup diameter (mm)", "stirrup_diameter_mm", 10.0)?;
        let md = self.ask_number("Design moment Md (kNm)", "md_knm", 0.0)?;

        let input = BendingInput::from_profile(
            self.app.store().active(),
            &section,
            &rebar,
            RebarLayout::new(count, diameter),
            stirrup,
            md,
        )?;
        let result = calculate(&input)?;

        writeln!(self.out)?;
        writeln!(self.out, "═══════════════════════════════════════")?;
        writeln!(self.out, "  BENDING CAPACITY - {}", input.label)?;
        writeln!(self.out, "═══════════════════════════════════════")?;
        write!(self.out, "{}", result.report())?;
        writeln!(self.out, "═══════════════════════════════════════")?;
        writeln!(
            self.out,
            "  RESULT: {} {}",
            result.status,
            status_icon(result.passes())
        )?;
        writeln!(self.out, "═══════════════════════════════════════")?;
        Ok(())
    }

    fn theme(&mut self, rest: &str) -> CliResult<()> {
        if rest.is_empty() {
            writeln!(self.out, "Theme: {} (dark, light, system)", self.app.settings().theme)?;
            return Ok(());
        }
        let theme: Theme = rest.parse()?;
        self.app.set_theme(theme)?;
        writeln!(self.out, "Theme set to {}.", theme)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(dir: &std::path::Path, script: &str) -> (AppContext, String) {
        let app = AppContext::open(dir).unwrap();
        let mut session = Session::new(app, Cursor::new(script.as_bytes().to_vec()), Vec::new());
        session.run().unwrap();
        let (app, out) = session.into_parts();
        (app, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("  profile new  Köprü Projesi "), ("profile", "new  Köprü Projesi"));
        assert_eq!(split_word("help"), ("help", ""));
        assert_eq!(split_word(""), ("", ""));
    }

    #[test]
    fn test_full_bending_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
profile new Köprü
material add C25
concrete
C25/30
material add S420
rebar
B420C
section add K1
rectangular
300
500
C25
30
bending
K1
S420
3
16
10
80
quit
";
        let (app, out) = run_script(dir.path(), script);

        assert!(out.contains("Profile 'Köprü' created and selected."));
        assert!(out.contains("Section 'K1' added."));
        assert!(out.contains("= 93.86 kNm"));
        assert!(out.contains("RESULT: SUFFICIENT [OK]"));
        assert!(out.contains("Bye."));

        assert_eq!(app.store().active_name(), "Köprü");
        assert!(app.store().active().sections.contains("K1"));
        drop(app);

        // Everything was persisted
        let reopened = AppContext::open(dir.path()).unwrap();
        assert_eq!(reopened.store().active_name(), "Köprü");
        assert_eq!(reopened.store().active().materials.len(), 2);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
profile new A
profile delete A
n
profiles
profile delete A
y
";
        let (app, out) = run_script(dir.path(), script);
        assert!(out.contains("Cancelled."));
        assert!(out.contains("Profile 'A' deleted."));
        assert!(out.contains("Active profile is now 'Default Profile'."));
        assert!(!app.store().contains("A"));
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
material delete Nope
profile delete

y
frobnicate
info set engineer Ayşe Yılmaz
info
";
        let (app, out) = run_script(dir.path(), script);
        assert!(out.contains("Error: Material not found: 'Nope'"));
        assert!(out.contains("at least one profile must remain"));
        assert!(out.contains("Unknown command 'frobnicate'"));
        assert!(out.contains("Engineer:     Ayşe Yılmaz"));
        assert_eq!(app.store().active().project_info.engineer, "Ayşe Yılmaz");
    }

    #[test]
    fn test_invalid_number_in_form() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
material add Özel
concrete
Custom
yirmi
materials
";
        let (app, out) = run_script(dir.path(), script);
        assert!(out.contains("Error: Invalid number for 'fck': 'yirmi'"));
        assert!(out.contains("No materials in this profile."));
        assert!(app.store().active().materials.is_empty());
    }

    #[test]
    fn test_material_rename_follows_sections() {
        let dir = tempfile::tempdir().unwrap();
        let script = "\
material add C25
concrete
C25/30
section add S1
circular
400
C25
40
material edit C25
C25 Temel


sections
";
        let (app, out) = run_script(dir.path(), script);
        assert!(out.contains("Material 'C25 Temel' updated."));
        assert_eq!(
            app.store().active().sections.get("S1").unwrap().material_name,
            "C25 Temel"
        );
        assert!(!out.contains("(missing!)"));
    }

    #[test]
    fn test_theme() {
        let dir = tempfile::tempdir().unwrap();
        let (app, out) = run_script(dir.path(), "theme dark\ntheme\ntheme neon\n");
        assert!(out.contains("Theme set to dark."));
        assert!(out.contains("Theme: dark"));
        assert!(out.contains("Error: Invalid input for 'theme'"));
        assert_eq!(app.settings().theme, Theme::Dark);
    }
}
