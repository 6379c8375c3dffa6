mod overlays;
