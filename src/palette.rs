use crate::swatch::Swatch;
use std::fmt;

/// Named palette slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Vibrant,
    LightVibrant,
    DarkVibrant,
    Muted,
    LightMuted,
    DarkMuted,
}

impl Role {
    /// Selection order used by the generator.
    pub const ALL: [Role; 6] = [
        Role::Vibrant,
        Role::LightVibrant,
        Role::DarkVibrant,
        Role::Muted,
        Role::LightMuted,
        Role::DarkMuted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Vibrant => "vibrant",
            Role::LightVibrant => "light vibrant",
            Role::DarkVibrant => "dark vibrant",
            Role::Muted => "muted",
            Role::LightMuted => "light muted",
            Role::DarkMuted => "dark muted",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct Palette {
    vibrant: Option<Swatch>,
    light_vibrant: Option<Swatch>,
    dark_vibrant: Option<Swatch>,
    muted: Option<Swatch>,
    light_muted: Option<Swatch>,
    dark_muted: Option<Swatch>,
}

impl Palette {
    #[inline]
    pub fn vibrant(&self) -> Option<&Swatch> {
        self.vibrant.as_ref()
    }

    #[inline]
    pub fn light_vibrant(&self) -> Option<&Swatch> {
        self.light_vibrant.as_ref()
    }

    #[inline]
    pub fn dark_vibrant(&self) -> Option<&Swatch> {
        self.dark_vibrant.as_ref()
    }

    #[inline]
    pub fn muted(&self) -> Option<&Swatch> {
        self.muted.as_ref()
    }

    #[inline]
    pub fn light_muted(&self) -> Option<&Swatch> {
        self.light_muted.as_ref()
    }

    #[inline]
    pub fn dark_muted(&self) -> Option<&Swatch> {
        self.dark_muted.as_ref()
    }

    fn slot(&self, role: Role) -> &Option<Swatch> {
        match role {
            Role::Vibrant => &self.vibrant,
            Role::LightVibrant => &self.light_vibrant,
            Role::DarkVibrant => &self.dark_vibrant,
            Role::Muted => &self.muted,
            Role::LightMuted => &self.light_muted,
            Role::DarkMuted => &self.dark_muted,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<Swatch> {
        match role {
            Role::Vibrant => &mut self.vibrant,
            Role::LightVibrant => &mut self.light_vibrant,
            Role::DarkVibrant => &mut self.dark_vibrant,
            Role::Muted => &mut self.muted,
            Role::LightMuted => &mut self.light_muted,
            Role::DarkMuted => &mut self.dark_muted,
        }
    }

    #[inline]
    pub fn get(&self, role: Role) -> Option<&Swatch> {
        self.slot(role).as_ref()
    }

    pub fn set(&mut self, role: Role, swatch: Swatch) {
        *self.slot_mut(role) = Some(swatch);
    }

    /// Whether a swatch of the same color already fills any slot.
    pub fn contains(&self, swatch: &Swatch) -> bool {
        Role::ALL.iter().any(|&role| self.get(role) == Some(swatch))
    }

    pub fn is_empty(&self) -> bool {
        Role::ALL.iter().all(|&role| self.get(role).is_none())
    }

    /// Filled slots in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &Swatch)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|swatch| (role, swatch)))
    }
}
