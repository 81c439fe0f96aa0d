//! Fallback for packages that ship `AndroidManifest.xml` as plain text.
//!
//! Only start tags are looked at. Attribute names are matched by local name, so
//! `android:versionName` and `versionName` are the same key, like resolved binary names.

use crate::android::manifest::{ManifestError, ManifestFacts, ManifestResult};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::peek;
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair};
use nom::IResult;

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && c != '=' && c != '>' && c != '/' && c != '<'
}

fn quoted_value(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        delimited(char('\''), take_till(|c| c == '\''), char('\'')),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(multispace0, take_while1(is_name_char)),
        delimited(multispace0, char('='), multispace0),
        quoted_value,
    )(input)
}

fn start_tag<'a>(name: &'a str) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<(&'a str, &'a str)>> {
    move |input| {
        let (input, _) = char('<')(input)?;
        let (input, _) = tag(name)(input)?;
        let (input, _) = peek(alt((multispace1, tag(">"), tag("/"))))(input)?;
        let (input, attributes) = many0(attribute)(input)?;
        let (input, _) = preceded(multispace0, alt((tag("/>"), tag(">"))))(input)?;
        Ok((input, attributes))
    }
}

/// Attributes of the first well-formed `<name ...>` start tag in `xml`.
fn find_start_tag<'a>(xml: &'a str, name: &'a str) -> Option<Vec<(&'a str, &'a str)>> {
    let mut parser = start_tag(name);
    xml.match_indices('<')
        .find_map(|(at, _)| parser(&xml[at..]).ok().map(|(_, attributes)| attributes))
}

fn local_name(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}

fn lookup(attributes: &[(&str, &str)], name: &str) -> Option<String> {
    attributes
        .iter()
        .rev()
        .find(|(key, _)| local_name(key) == name)
        .map(|(_, value)| unescape(value))
}

fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Reads package facts from a textual manifest.
pub fn parse_text_manifest(xml: &str) -> ManifestResult<ManifestFacts> {
    let manifest = find_start_tag(xml, "manifest").ok_or(ManifestError::NoManifestTag)?;
    let package_name = lookup(&manifest, "package")
        .filter(|package| !package.is_empty())
        .ok_or(ManifestError::MissingPackage)?;
    let launchable_activity =
        find_start_tag(xml, "activity").and_then(|activity| lookup(&activity, "name"));

    Ok(ManifestFacts {
        package_name,
        version_name: lookup(&manifest, "versionName"),
        version_code: lookup(&manifest, "versionCode"),
        launchable_activity,
    })
}
